//! Append-only history of review envelopes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ReportError;
use crate::report::{parse_agent_report, AgentReportV2};

pub type StoreResult<T> = Result<T, ReportError>;

/// Storage for review envelopes.
///
/// Every review appends a new row; earlier rows are kept as history and
/// are read back through [`parse_agent_report`].
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Append an envelope for an organization
    async fn append(&self, organization_id: Uuid, envelope: &AgentReportV2) -> StoreResult<()>;

    /// Most recent envelope, upgraded to the latest version
    async fn latest(&self, organization_id: Uuid) -> StoreResult<Option<AgentReportV2>>;

    /// Every envelope, oldest first
    async fn history(&self, organization_id: Uuid) -> StoreResult<Vec<AgentReportV2>>;
}

/// In-memory report store keeping raw JSON rows
#[derive(Debug, Default, Clone)]
pub struct InMemoryReportStore {
    rows: Arc<RwLock<HashMap<Uuid, Vec<Value>>>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw stored row as-is, e.g. a legacy envelope.
    pub async fn insert_raw(&self, organization_id: Uuid, row: Value) {
        self.rows
            .write()
            .await
            .entry(organization_id)
            .or_default()
            .push(row);
    }

    pub async fn row_count(&self, organization_id: Uuid) -> usize {
        self.rows
            .read()
            .await
            .get(&organization_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn append(&self, organization_id: Uuid, envelope: &AgentReportV2) -> StoreResult<()> {
        let row = envelope.to_value()?;
        self.insert_raw(organization_id, row).await;
        Ok(())
    }

    async fn latest(&self, organization_id: Uuid) -> StoreResult<Option<AgentReportV2>> {
        let rows = self.rows.read().await;
        rows.get(&organization_id)
            .and_then(|rows| rows.last())
            .map(parse_agent_report)
            .transpose()
    }

    async fn history(&self, organization_id: Uuid) -> StoreResult<Vec<AgentReportV2>> {
        let rows = self.rows.read().await;
        rows.get(&organization_id)
            .map(|rows| rows.iter().map(parse_agent_report).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::build_agent_report;
    use crate::test_support::snapshot;
    use review_types::{
        AgentReviewResult, ReviewAgentReport, ReviewContext, ReviewVerdict, UsageInfo,
    };
    use serde_json::json;

    fn envelope(verdict: ReviewVerdict, review_type: &str) -> AgentReportV2 {
        let mut report = ReviewAgentReport {
            verdict,
            overall_risk_score: 40.0,
            summary: "summary".to_string(),
            merchant_summary: "merchant".to_string(),
            violated_sections: Vec::new(),
            dimensions: Vec::new(),
            recommended_action: String::new(),
        };
        report.normalize();
        build_agent_report(
            &AgentReviewResult {
                report,
                data_snapshot: snapshot(ReviewContext::Threshold),
                model_used: "scripted".to_string(),
                duration_seconds: 1.5,
                usage: UsageInfo::default(),
                timed_out: false,
                error: None,
                reviewed_at: chrono::Utc::now(),
            },
            review_type,
        )
    }

    #[tokio::test]
    async fn test_appends_never_overwrite() {
        let store = InMemoryReportStore::new();
        let organization_id = Uuid::new_v4();

        store
            .append(organization_id, &envelope(ReviewVerdict::Deny, "submission"))
            .await
            .unwrap();
        store
            .append(organization_id, &envelope(ReviewVerdict::Approve, "manual"))
            .await
            .unwrap();

        let history = store.history(organization_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].review_type, "submission");

        let latest = store.latest(organization_id).await.unwrap().unwrap();
        assert_eq!(latest.report.verdict, ReviewVerdict::Approve);
        assert_eq!(latest.review_type, "manual");
    }

    #[tokio::test]
    async fn test_legacy_rows_are_upgraded_on_read() {
        let store = InMemoryReportStore::new();
        let organization_id = Uuid::new_v4();

        let mut legacy = envelope(ReviewVerdict::Deny, "submission").to_value().unwrap();
        legacy.as_object_mut().unwrap().remove("version");
        store.insert_raw(organization_id, legacy).await;

        let latest = store.latest(organization_id).await.unwrap().unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(store.row_count(organization_id).await, 1);
    }

    #[tokio::test]
    async fn test_unknown_version_surfaces_error() {
        let store = InMemoryReportStore::new();
        let organization_id = Uuid::new_v4();
        store
            .insert_raw(organization_id, json!({ "version": 99 }))
            .await;

        assert!(matches!(
            store.latest(organization_id).await,
            Err(ReportError::UnsupportedVersion(99))
        ));
        assert!(store.history(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
