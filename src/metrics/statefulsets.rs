use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::StatefulSet;

use super::base::{created_nanos, list_or_report, name_of, namespace_of, with_selector_tags};
use super::STATEFULSETS;
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::types::{Metric, STATEFULSET_MEASUREMENT};

pub async fn collect_statefulsets(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, STATEFULSETS, ctx.client.list_namespaced::<StatefulSet>()).await else {
        return;
    };
    let now = Utc::now();
    for sts in &items {
        if let Some(metric) = statefulset_metric(sts, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub fn statefulset_metric(sts: &StatefulSet, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&sts.metadata)?;
    let status = sts.status.as_ref();
    let spec = sts.spec.as_ref();

    let mut metric = Metric::new(STATEFULSET_MEASUREMENT, now)
        .tag("statefulset_name", name)
        .tag("namespace", namespace_of(&sts.metadata))
        .field("generation", sts.metadata.generation.unwrap_or(0))
        .field("replicas", status.map(|s| s.replicas).unwrap_or(0))
        .field("replicas_current", status.and_then(|s| s.current_replicas).unwrap_or(0))
        .field("replicas_ready", status.and_then(|s| s.ready_replicas).unwrap_or(0))
        .field("replicas_updated", status.and_then(|s| s.updated_replicas).unwrap_or(0))
        .field("spec_replicas", spec.and_then(|s| s.replicas).unwrap_or(0))
        .field("observed_generation", status.and_then(|s| s.observed_generation).unwrap_or(0));

    if let Some(created) = created_nanos(&sts.metadata) {
        metric = metric.field("created", created);
    }
    Some(with_selector_tags(metric, spec.map(|s| &s.selector)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use k8s_openapi::api::apps::v1::{StatefulSetSpec, StatefulSetStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_statefulset_metric() {
        let sts = StatefulSet {
            metadata: ObjectMeta {
                name: Some("db".to_string()),
                namespace: Some("prod".to_string()),
                generation: Some(332),
                ..Default::default()
            },
            spec: Some(StatefulSetSpec {
                replicas: Some(3),
                ..Default::default()
            }),
            status: Some(StatefulSetStatus {
                replicas: 2,
                current_replicas: Some(4),
                ready_replicas: Some(1),
                updated_replicas: Some(3),
                observed_generation: Some(119),
                ..Default::default()
            }),
        };

        let metric = statefulset_metric(&sts, Utc::now()).unwrap();
        assert_eq!(metric.measurement, STATEFULSET_MEASUREMENT);
        assert_eq!(metric.get_tag("statefulset_name"), Some("db"));
        assert_eq!(metric.get_field("generation"), Some(&FieldValue::Int(332)));
        assert_eq!(metric.get_field("replicas"), Some(&FieldValue::Int(2)));
        assert_eq!(metric.get_field("replicas_current"), Some(&FieldValue::Int(4)));
        assert_eq!(metric.get_field("replicas_ready"), Some(&FieldValue::Int(1)));
        assert_eq!(metric.get_field("replicas_updated"), Some(&FieldValue::Int(3)));
        assert_eq!(metric.get_field("spec_replicas"), Some(&FieldValue::Int(3)));
        assert_eq!(metric.get_field("observed_generation"), Some(&FieldValue::Int(119)));
    }
}
