//! Review orchestration.
//!
//! One run resolves the records of one organization, collects every snapshot
//! fragment, calls the analyzer once and wraps the outcome. Independent
//! fetches run concurrently; dependent lookups keep their order (admin user
//! before history, payout account before identity).

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use review_model::{build_model, LanguageModel};
use review_types::{AgentReviewResult, DataSnapshot, OrganizationRecord, ReviewContext};

use crate::analyzer::RiskAnalyzer;
use crate::collectors::{
    collect_account_data, collect_history_data, collect_identity_data, collect_organization_data,
    collect_payment_metrics, collect_products_data, collect_setup_data, collect_website_data,
};
use crate::config::ReviewAgentConfig;
use crate::error::{RepositoryError, ReviewError, ReviewResult};
use crate::policy::PolicyDocumentFetcher;
use crate::providers::{PaymentsProvider, StripeProvider};
use crate::repository::ReviewRepository;
use crate::website::{BrowserDriver, HttpBrowser};

/// Entry point of the review pipeline.
pub struct ReviewAgent {
    config: ReviewAgentConfig,
    model: Arc<dyn LanguageModel>,
    analyzer: RiskAnalyzer,
    browser: Arc<dyn BrowserDriver>,
    provider: Option<Arc<dyn PaymentsProvider>>,
}

impl ReviewAgent {
    pub fn new(
        config: ReviewAgentConfig,
        model: Arc<dyn LanguageModel>,
        policy: Arc<PolicyDocumentFetcher>,
        browser: Arc<dyn BrowserDriver>,
    ) -> Self {
        let analyzer = RiskAnalyzer::new(model.clone(), policy);
        Self {
            config,
            model,
            analyzer,
            browser,
            provider: None,
        }
    }

    /// Build every collaborator from configuration.
    ///
    /// The payments provider is optional: without a secret key the identity
    /// and account collectors use local records only.
    pub fn from_config(config: ReviewAgentConfig) -> ReviewResult<Self> {
        let model = build_model(&config.model).map_err(|e| ReviewError::Config(e.to_string()))?;
        let policy = Arc::new(PolicyDocumentFetcher::new(&config.policy));
        let browser = HttpBrowser::new(
            &config.website.user_agent,
            config.website.navigation_timeout(),
        )
        .map_err(|e| ReviewError::Config(e.to_string()))?;

        let provider = match StripeProvider::from_config(&config.payments) {
            Ok(provider) => Some(Arc::new(provider) as Arc<dyn PaymentsProvider>),
            Err(e) => {
                tracing::info!(reason = %e, "Payments provider disabled");
                None
            }
        };

        let mut agent = Self::new(config, model, policy, Arc::new(browser));
        agent.provider = provider;
        Ok(agent)
    }

    pub fn with_provider(mut self, provider: Arc<dyn PaymentsProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &ReviewAgentConfig {
        &self.config
    }

    /// Review one organization.
    ///
    /// Collector and analyzer problems are absorbed where they happen; only
    /// repository failures reach the caller.
    pub async fn run_organization_review(
        &self,
        repository: &dyn ReviewRepository,
        organization: &OrganizationRecord,
        context: ReviewContext,
    ) -> ReviewResult<AgentReviewResult> {
        let started = Instant::now();
        tracing::info!(
            organization_id = %organization.id,
            slug = %organization.slug,
            context = %context,
            "Review started"
        );

        match self.review(repository, organization, context, started).await {
            Ok(result) => {
                tracing::info!(
                    organization_id = %organization.id,
                    slug = %organization.slug,
                    verdict = %result.report.verdict,
                    risk_score = result.report.overall_risk_score,
                    timed_out = result.timed_out,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Review completed"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    organization_id = %organization.id,
                    slug = %organization.slug,
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Review failed"
                );
                Err(e)
            }
        }
    }

    async fn review(
        &self,
        repository: &dyn ReviewRepository,
        organization: &OrganizationRecord,
        context: ReviewContext,
        started: Instant,
    ) -> ReviewResult<AgentReviewResult> {
        let snapshot = self.collect_snapshot(repository, organization, context).await?;
        let analysis = self
            .analyzer
            .analyze(&snapshot, context, self.config.analyzer.timeout())
            .await;

        let website_usage = snapshot
            .website
            .as_ref()
            .map(|website| website.usage.clone())
            .unwrap_or_default();

        Ok(AgentReviewResult {
            report: analysis.report,
            model_used: self.model.model_name().to_string(),
            duration_seconds: started.elapsed().as_secs_f64(),
            usage: analysis.usage.merge(&website_usage),
            timed_out: analysis.timed_out,
            error: analysis.error,
            reviewed_at: Utc::now(),
            data_snapshot: snapshot,
        })
    }

    async fn collect_snapshot(
        &self,
        repository: &dyn ReviewRepository,
        organization: &OrganizationRecord,
        context: ReviewContext,
    ) -> ReviewResult<DataSnapshot> {
        let organization_id = organization.id;
        let provider = self.provider.as_deref();

        let people = async {
            let user = repository.admin_user(organization_id).await?;
            let organizations = match &user {
                Some(user) => repository.user_organizations(user.id).await?,
                None => Vec::new(),
            };
            Ok::<_, RepositoryError>((user, organizations))
        };

        let account = async {
            let record = match organization.account_id {
                Some(account_id) => repository.payout_account(account_id).await?,
                None => None,
            };
            Ok::<_, RepositoryError>(collect_account_data(record.as_ref(), provider).await)
        };

        let catalog = async {
            let setup = async {
                if context.includes_setup() {
                    repository.setup_records(organization_id).await.map(Some)
                } else {
                    Ok(None)
                }
            };
            tokio::try_join!(
                repository.products(organization_id),
                repository.payment_activity(organization_id),
                setup
            )
        };

        // Never fails; joined fallibly so a repository error drops the exploration.
        let website = async {
            Ok::<_, RepositoryError>(
                collect_website_data(
                    organization.website.as_deref(),
                    self.model.as_ref(),
                    self.browser.as_ref(),
                    &self.config.website,
                )
                .await,
            )
        };

        let ((user, organizations), account, (products, payments, setup_records), website) =
            tokio::try_join!(people, account, catalog, website)?;

        let identity = if context.includes_identity() {
            Some(collect_identity_data(user.as_ref(), provider).await)
        } else {
            None
        };

        Ok(DataSnapshot {
            context,
            organization: collect_organization_data(organization),
            products: collect_products_data(&products),
            account,
            identity,
            metrics: collect_payment_metrics(&payments),
            history: collect_history_data(user.as_ref(), &organizations, organization_id),
            website,
            setup: setup_records.map(|records| collect_setup_data(&records, &products)),
            collected_at: Utc::now(),
        })
    }
}

impl std::fmt::Debug for ReviewAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewAgent")
            .field("model", &self.model.model_name())
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
