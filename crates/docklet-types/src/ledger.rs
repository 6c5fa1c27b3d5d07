//! Per-item outcomes of a batch run
//!
//! A `ResultLedger` is append-only for the duration of one batch: entries can
//! be pushed and read but never modified or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::container::ContainerSummary;
use crate::matches::MatchKey;

/// Furthest step a multi-step item reached
///
/// Redeploys walk `Planned -> SourceStopped -> SourceRemoved -> TargetCreated`,
/// migrations walk `Planned -> TargetCreated -> SourceRemoved`. Simple actions
/// go straight from `Pending` to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    Pending,
    Planned,
    SourceStopped,
    SourceRemoved,
    TargetCreated,
    Completed,
}

impl ItemStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStage::Pending => "pending",
            ItemStage::Planned => "planned",
            ItemStage::SourceStopped => "source_stopped",
            ItemStage::SourceRemoved => "source_removed",
            ItemStage::TargetCreated => "target_created",
            ItemStage::Completed => "completed",
        }
    }
}

impl std::fmt::Display for ItemStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one item in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub key: MatchKey,
    pub ok: bool,
    pub node_name: String,
    /// First 12 characters of the container id
    pub container_id: String,
    pub container_name: String,
    pub message: String,
    pub stage: ItemStage,
}

impl ItemResult {
    pub fn success(
        key: MatchKey,
        node_name: impl Into<String>,
        container: &ContainerSummary,
        message: impl Into<String>,
        stage: ItemStage,
    ) -> Self {
        Self::build(key, true, node_name.into(), container, message.into(), stage)
    }

    pub fn failure(
        key: MatchKey,
        node_name: impl Into<String>,
        container: &ContainerSummary,
        message: impl Into<String>,
        stage: ItemStage,
    ) -> Self {
        Self::build(key, false, node_name.into(), container, message.into(), stage)
    }

    fn build(
        key: MatchKey,
        ok: bool,
        node_name: String,
        container: &ContainerSummary,
        message: String,
        stage: ItemStage,
    ) -> Self {
        Self {
            key,
            ok,
            node_name,
            container_id: container.short_id(),
            container_name: container.primary_name(),
            message,
            stage,
        }
    }
}

/// Ordered, append-only list of item outcomes for one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultLedger {
    entries: Vec<ItemResult>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    cancelled: bool,
}

impl Default for ResultLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            cancelled: false,
        }
    }

    pub fn push(&mut self, result: ItemResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[ItemResult] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.ok).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.ok).count()
    }

    pub fn has_failures(&self) -> bool {
        self.entries.iter().any(|entry| !entry.ok)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Whether the batch stopped early because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Operator-facing summary, e.g. `2 of 5 failed`
    pub fn summary(&self) -> String {
        let total = self.entries.len();
        let mut summary = match self.failed_count() {
            0 => format!("all {} succeeded", total),
            failed => format!("{} of {} failed", failed, total),
        };
        if self.cancelled {
            summary.push_str(" (cancelled)");
        }
        summary
    }
}

impl<'a> IntoIterator for &'a ResultLedger {
    type Item = &'a ItemResult;
    type IntoIter = std::slice::Iter<'a, ItemResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(id: &str) -> ContainerSummary {
        ContainerSummary {
            id: id.to_string(),
            image: "nginx".to_string(),
            names: vec![format!("/{}", id)],
            ..Default::default()
        }
    }

    fn result(id: &str, ok: bool) -> ItemResult {
        let key = MatchKey::new("n1", id);
        if ok {
            ItemResult::success(key, "alpha", &container(id), "deleted", ItemStage::Completed)
        } else {
            ItemResult::failure(key, "alpha", &container(id), "boom", ItemStage::Pending)
        }
    }

    #[test]
    fn test_ledger_preserves_order_and_counts() {
        let mut ledger = ResultLedger::new();
        ledger.push(result("a", true));
        ledger.push(result("b", false));
        ledger.push(result("c", true));

        assert_eq!(ledger.len(), 3);
        let ids: Vec<_> = ledger.iter().map(|r| r.container_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(ledger.failed_count(), 1);
        assert_eq!(ledger.succeeded_count(), 2);
        assert!(ledger.has_failures());
        assert_eq!(ledger.summary(), "1 of 3 failed");
    }

    #[test]
    fn test_summary_all_succeeded_and_cancelled() {
        let mut ledger = ResultLedger::new();
        ledger.push(result("a", true));
        assert_eq!(ledger.summary(), "all 1 succeeded");

        ledger.mark_cancelled();
        assert_eq!(ledger.summary(), "all 1 succeeded (cancelled)");
    }

    #[test]
    fn test_item_result_shortens_id() {
        let item = ItemResult::success(
            MatchKey::new("n1", "0123456789abcdef"),
            "alpha",
            &container("0123456789abcdef"),
            "started",
            ItemStage::Completed,
        );
        assert_eq!(item.container_id, "0123456789ab");
        assert_eq!(item.container_name, "0123456789abcdef");
        assert_eq!(item.key.to_string(), "n1:0123456789abcdef");
    }

    #[test]
    fn test_finish_records_timestamp() {
        let mut ledger = ResultLedger::new();
        assert!(ledger.finished_at().is_none());
        ledger.finish();
        assert!(ledger.finished_at().unwrap() >= ledger.started_at());
    }
}
