//! Repository boundary supplying domain records to the collectors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use review_types::{
    AccountRecord, OrganizationRecord, PaymentActivity, PriorOrganizationRecord, ProductRecord,
    SetupRecords, UserRecord,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::providers::StaticProvider;

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Read-only access to the records a review needs.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Admin user of an organization
    async fn admin_user(&self, organization_id: Uuid) -> RepositoryResult<Option<UserRecord>>;

    /// Products, including archived ones
    async fn products(&self, organization_id: Uuid) -> RepositoryResult<Vec<ProductRecord>>;

    /// Linked payout account
    async fn payout_account(&self, account_id: Uuid) -> RepositoryResult<Option<AccountRecord>>;

    async fn payment_activity(&self, organization_id: Uuid) -> RepositoryResult<PaymentActivity>;

    /// Every organization the user belongs to
    async fn user_organizations(&self, user_id: Uuid)
        -> RepositoryResult<Vec<PriorOrganizationRecord>>;

    async fn setup_records(&self, organization_id: Uuid) -> RepositoryResult<SetupRecords>;
}

/// Everything needed to review one organization offline.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewFixture {
    pub organization: OrganizationRecord,
    #[serde(default)]
    pub admin_user: Option<UserRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub account: Option<AccountRecord>,
    #[serde(default)]
    pub payments: PaymentActivity,
    /// Other organizations owned by the admin user
    #[serde(default)]
    pub other_organizations: Vec<PriorOrganizationRecord>,
    #[serde(default)]
    pub setup: SetupRecords,
    /// Canned payments provider responses
    #[serde(default)]
    pub provider: Option<StaticProvider>,
}

#[derive(Debug, Default)]
struct OrganizationRows {
    admin_user_id: Option<Uuid>,
    products: Vec<ProductRecord>,
    payments: PaymentActivity,
    setup: SetupRecords,
}

/// In-memory repository for tests and fixture-driven runs
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    organizations: Arc<RwLock<HashMap<Uuid, OrganizationRows>>>,
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
    accounts: Arc<RwLock<HashMap<Uuid, AccountRecord>>>,
    memberships: Arc<RwLock<HashMap<Uuid, Vec<PriorOrganizationRecord>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fixture, returning the organization under review.
    pub async fn insert_fixture(&self, fixture: ReviewFixture) -> OrganizationRecord {
        let organization = fixture.organization;

        if let Some(account) = fixture.account {
            self.accounts.write().await.insert(account.id, account);
        }

        let admin_user_id = fixture.admin_user.as_ref().map(|user| user.id);
        if let Some(user) = fixture.admin_user {
            let mut memberships = self.memberships.write().await;
            let entry = memberships.entry(user.id).or_default();
            entry.push(PriorOrganizationRecord {
                id: organization.id,
                slug: organization.slug.clone(),
                status: organization.status,
                review_verdict: None,
                appeal_decision: None,
                blocked_at: organization.blocked_at,
                created_at: organization.created_at,
            });
            entry.extend(fixture.other_organizations);
            self.users.write().await.insert(user.id, user);
        }

        self.organizations.write().await.insert(
            organization.id,
            OrganizationRows {
                admin_user_id,
                products: fixture.products,
                payments: fixture.payments,
                setup: fixture.setup,
            },
        );

        organization
    }

    async fn rows<T>(
        &self,
        organization_id: Uuid,
        read: impl FnOnce(&OrganizationRows) -> T,
    ) -> RepositoryResult<T> {
        let organizations = self.organizations.read().await;
        organizations
            .get(&organization_id)
            .map(read)
            .ok_or_else(|| RepositoryError::NotFound(format!("organization {}", organization_id)))
    }
}

#[async_trait]
impl ReviewRepository for InMemoryRepository {
    async fn admin_user(&self, organization_id: Uuid) -> RepositoryResult<Option<UserRecord>> {
        let user_id = self.rows(organization_id, |rows| rows.admin_user_id).await?;
        let users = self.users.read().await;
        Ok(user_id.and_then(|id| users.get(&id).cloned()))
    }

    async fn products(&self, organization_id: Uuid) -> RepositoryResult<Vec<ProductRecord>> {
        self.rows(organization_id, |rows| rows.products.clone()).await
    }

    async fn payout_account(&self, account_id: Uuid) -> RepositoryResult<Option<AccountRecord>> {
        Ok(self.accounts.read().await.get(&account_id).cloned())
    }

    async fn payment_activity(&self, organization_id: Uuid) -> RepositoryResult<PaymentActivity> {
        self.rows(organization_id, |rows| rows.payments.clone()).await
    }

    async fn user_organizations(
        &self,
        user_id: Uuid,
    ) -> RepositoryResult<Vec<PriorOrganizationRecord>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn setup_records(&self, organization_id: Uuid) -> RepositoryResult<SetupRecords> {
        self.rows(organization_id, |rows| rows.setup.clone()).await
    }
}
