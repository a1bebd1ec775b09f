use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;

use super::base::{created_nanos, list_or_report, name_of, namespace_of, with_selector_tags};
use super::DEPLOYMENTS;
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::types::{Metric, DEPLOYMENT_MEASUREMENT};

pub async fn collect_deployments(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, DEPLOYMENTS, ctx.client.list_namespaced::<Deployment>()).await else {
        return;
    };
    let now = Utc::now();
    for deployment in &items {
        if let Some(metric) = deployment_metric(deployment, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub fn deployment_metric(deployment: &Deployment, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&deployment.metadata)?;
    let status = deployment.status.as_ref();

    let mut metric = Metric::new(DEPLOYMENT_MEASUREMENT, now)
        .tag("deployment_name", name)
        .tag("namespace", namespace_of(&deployment.metadata))
        .field("replicas_available", status.and_then(|s| s.available_replicas).unwrap_or(0))
        .field("replicas_unavailable", status.and_then(|s| s.unavailable_replicas).unwrap_or(0));

    if let Some(created) = created_nanos(&deployment.metadata) {
        metric = metric.field("created", created);
    }
    Some(with_selector_tags(metric, deployment.spec.as_ref().map(|s| &s.selector)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use chrono::TimeZone;
    use k8s_openapi::api::apps::v1::DeploymentStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

    #[test]
    fn test_deployment_metric() {
        let created = Utc.timestamp_opt(1_500_000_000, 0).unwrap();
        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some("api".to_string()),
                namespace: Some("prod".to_string()),
                creation_timestamp: Some(Time(created)),
                ..Default::default()
            },
            status: Some(DeploymentStatus {
                available_replicas: Some(3),
                unavailable_replicas: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };

        let metric = deployment_metric(&deployment, Utc::now()).unwrap();
        assert_eq!(metric.get_tag("deployment_name"), Some("api"));
        assert_eq!(metric.get_tag("namespace"), Some("prod"));
        assert_eq!(metric.get_field("replicas_available"), Some(&FieldValue::Int(3)));
        assert_eq!(metric.get_field("replicas_unavailable"), Some(&FieldValue::Int(1)));
        assert_eq!(
            metric.get_field("created"),
            Some(&FieldValue::Int(1_500_000_000_000_000_000))
        );
    }

    #[test]
    fn test_deployment_without_status_reports_zero() {
        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some("new".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let metric = deployment_metric(&deployment, Utc::now()).unwrap();
        assert_eq!(metric.get_field("replicas_available"), Some(&FieldValue::Int(0)));
        assert_eq!(metric.get_tag("namespace"), Some(""));
    }
}
