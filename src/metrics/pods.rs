use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod};
use std::time::Duration;

use super::base::{created_at, list_or_report, name_of, namespace_of};
use super::PODS;
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::parsing::{parse_cpu_to_millicores, parse_memory_to_bytes};
use crate::types::{Metric, POD_CONTAINER_MEASUREMENT};

pub async fn collect_pods(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, PODS, ctx.client.list_namespaced::<Pod>()).await else {
        return;
    };
    let now = Utc::now();
    let mut skipped = 0usize;
    for pod in &items {
        if is_stale(pod, ctx.config.max_pod_age, now) {
            skipped += 1;
            continue;
        }
        for metric in pod_container_metrics(pod, now) {
            ctx.acc.add_metric(metric);
        }
    }
    if skipped > 0 {
        tracing::debug!("skipped {} finished pod(s) older than max pod age", skipped);
    }
}

/// A finished pod (Succeeded or Failed) created before `now - max_age`.
pub fn is_stale(pod: &Pod, max_age: Option<Duration>, now: DateTime<Utc>) -> bool {
    let Some(max_age) = max_age.and_then(|d| chrono::Duration::from_std(d).ok()) else {
        return false;
    };
    let finished = matches!(
        pod.status.as_ref().and_then(|s| s.phase.as_deref()),
        Some("Succeeded") | Some("Failed")
    );
    let Some(cutoff) = now.checked_sub_signed(max_age) else {
        return false;
    };
    finished && created_at(&pod.metadata).map(|t| t < cutoff).unwrap_or(false)
}

/// One metric per container declared in the pod spec.
pub fn pod_container_metrics(pod: &Pod, now: DateTime<Utc>) -> Vec<Metric> {
    let Some(pod_name) = name_of(&pod.metadata) else {
        return Vec::new();
    };
    let Some(spec) = pod.spec.as_ref() else {
        return Vec::new();
    };
    let statuses = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_deref())
        .unwrap_or(&[]);
    let node_name = spec.node_name.as_deref().unwrap_or("");

    spec.containers
        .iter()
        .map(|container| {
            let status = statuses.iter().find(|s| s.name == container.name);
            let metric = Metric::new(POD_CONTAINER_MEASUREMENT, now)
                .tag("container_name", container.name.as_str())
                .tag("namespace", namespace_of(&pod.metadata))
                .tag("node_name", node_name)
                .tag("pod_name", pod_name);
            let metric = status_fields(metric, status);
            resource_fields(metric, container)
        })
        .collect()
}

fn status_fields(metric: Metric, status: Option<&ContainerStatus>) -> Metric {
    let Some(status) = status else {
        return metric
            .tag("state", "unknown")
            .tag("readiness", "unready")
            .field("state_code", 3i64)
            .field("restarts_total", 0i64);
    };

    let state = status.state.as_ref();
    let (state_name, state_code) = match state {
        Some(s) if s.running.is_some() => ("running", 0i64),
        Some(s) if s.terminated.is_some() => ("terminated", 1),
        Some(s) if s.waiting.is_some() => ("waiting", 2),
        _ => ("unknown", 3),
    };

    let mut metric = metric
        .tag("state", state_name)
        .tag("readiness", if status.ready { "ready" } else { "unready" })
        .field("state_code", state_code)
        .field("restarts_total", status.restart_count);

    if let Some(reason) = state
        .and_then(|s| s.terminated.as_ref())
        .and_then(|t| t.reason.as_deref())
    {
        metric = metric.field("terminated_reason", reason);
    }
    metric
}

fn resource_fields(mut metric: Metric, container: &Container) -> Metric {
    let Some(resources) = container.resources.as_ref() else {
        return metric;
    };

    for (kind, quantities) in [("requests", &resources.requests), ("limits", &resources.limits)] {
        let Some(quantities) = quantities else { continue };
        if let Some(mc) = quantities.get("cpu").and_then(|q| parse_cpu_to_millicores(&q.0)) {
            metric = metric.field(&format!("resource_{}_millicpu_units", kind), mc);
        }
        if let Some(bytes) = quantities.get("memory").and_then(|q| parse_memory_to_bytes(&q.0)) {
            metric = metric.field(&format!("resource_{}_memory_bytes", kind), bytes);
        }
    }
    metric
}
