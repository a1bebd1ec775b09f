use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use std::future::Future;

use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::error::CollectError;
use crate::types::Metric;

/// Awaits a listing unless the poll is cancelled first. Failures are handed
/// to the accumulator and `None` is returned.
pub async fn list_or_report<T, Fut>(
    ctx: &CollectContext<InventoryClient>,
    collector: &str,
    listing: Fut,
) -> Option<Vec<T>>
where
    Fut: Future<Output = Result<Vec<T>, CollectError>>,
{
    let result = tokio::select! {
        _ = ctx.cancel.cancelled() => Err(CollectError::Cancelled),
        listed = listing => listed,
    };

    match result {
        Ok(items) => {
            tracing::debug!(collector = %collector, count = items.len(), "listed objects");
            Some(items)
        }
        Err(e) => {
            ctx.acc.add_error(collector, e);
            None
        }
    }
}

/// Adds a `selector_<key>` tag per match label.
pub fn with_selector_tags(mut metric: Metric, selector: Option<&LabelSelector>) -> Metric {
    if let Some(labels) = selector.and_then(|s| s.match_labels.as_ref()) {
        for (k, v) in labels {
            metric = metric.tag(&format!("selector_{}", k), v.as_str());
        }
    }
    metric
}

/// Creation time in unix nanoseconds.
pub fn created_nanos(meta: &ObjectMeta) -> Option<i64> {
    meta.creation_timestamp
        .as_ref()
        .and_then(|t| t.0.timestamp_nanos_opt())
}

pub fn created_at(meta: &ObjectMeta) -> Option<DateTime<Utc>> {
    meta.creation_timestamp.as_ref().map(|t| t.0)
}

pub fn name_of(meta: &ObjectMeta) -> Option<&str> {
    meta.name.as_deref()
}

pub fn namespace_of(meta: &ObjectMeta) -> &str {
    meta.namespace.as_deref().unwrap_or("")
}
