use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::DaemonSet;

use super::base::{created_nanos, list_or_report, name_of, namespace_of, with_selector_tags};
use super::DAEMONSETS;
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::types::{Metric, DAEMONSET_MEASUREMENT};

pub async fn collect_daemonsets(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, DAEMONSETS, ctx.client.list_namespaced::<DaemonSet>()).await else {
        return;
    };
    let now = Utc::now();
    for ds in &items {
        if let Some(metric) = daemonset_metric(ds, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub fn daemonset_metric(ds: &DaemonSet, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&ds.metadata)?;
    let status = ds.status.as_ref();

    let mut metric = Metric::new(DAEMONSET_MEASUREMENT, now)
        .tag("daemonset_name", name)
        .tag("namespace", namespace_of(&ds.metadata))
        .field("generation", ds.metadata.generation.unwrap_or(0))
        .field("current_number_scheduled", status.map(|s| s.current_number_scheduled).unwrap_or(0))
        .field("desired_number_scheduled", status.map(|s| s.desired_number_scheduled).unwrap_or(0))
        .field("number_available", status.and_then(|s| s.number_available).unwrap_or(0))
        .field("number_misscheduled", status.map(|s| s.number_misscheduled).unwrap_or(0))
        .field("number_ready", status.map(|s| s.number_ready).unwrap_or(0))
        .field("number_unavailable", status.and_then(|s| s.number_unavailable).unwrap_or(0))
        .field("updated_number_scheduled", status.and_then(|s| s.updated_number_scheduled).unwrap_or(0));

    if let Some(created) = created_nanos(&ds.metadata) {
        metric = metric.field("created", created);
    }
    Some(with_selector_tags(metric, ds.spec.as_ref().map(|s| &s.selector)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use k8s_openapi::api::apps::v1::{DaemonSetSpec, DaemonSetStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
    use std::collections::BTreeMap;

    #[test]
    fn test_daemonset_metric() {
        let ds = DaemonSet {
            metadata: ObjectMeta {
                name: Some("fluentd".to_string()),
                namespace: Some("logging".to_string()),
                generation: Some(11),
                ..Default::default()
            },
            spec: Some(DaemonSetSpec {
                selector: LabelSelector {
                    match_labels: Some(BTreeMap::from([("app".to_string(), "fluentd".to_string())])),
                    ..Default::default()
                },
                ..Default::default()
            }),
            status: Some(DaemonSetStatus {
                current_number_scheduled: 3,
                desired_number_scheduled: 5,
                number_available: Some(2),
                number_misscheduled: 2,
                number_ready: 1,
                number_unavailable: Some(1),
                updated_number_scheduled: Some(2),
                ..Default::default()
            }),
        };

        let metric = daemonset_metric(&ds, Utc::now()).unwrap();
        assert_eq!(metric.measurement, DAEMONSET_MEASUREMENT);
        assert_eq!(metric.get_tag("daemonset_name"), Some("fluentd"));
        assert_eq!(metric.get_tag("namespace"), Some("logging"));
        assert_eq!(metric.get_tag("selector_app"), Some("fluentd"));
        assert_eq!(metric.get_field("generation"), Some(&FieldValue::Int(11)));
        assert_eq!(metric.get_field("desired_number_scheduled"), Some(&FieldValue::Int(5)));
        assert_eq!(metric.get_field("number_misscheduled"), Some(&FieldValue::Int(2)));
        assert_eq!(metric.get_field("number_unavailable"), Some(&FieldValue::Int(1)));
        assert!(metric.get_field("created").is_none());
    }

    #[test]
    fn test_daemonset_without_name_is_skipped() {
        assert!(daemonset_metric(&DaemonSet::default(), Utc::now()).is_none());
    }
}
