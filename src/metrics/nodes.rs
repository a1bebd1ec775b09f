use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

use super::base::{list_or_report, name_of};
use super::NODES;
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::parsing::{parse_cpu_to_millicores, parse_memory_to_bytes};
use crate::types::{Metric, NODE_MEASUREMENT};

pub async fn collect_nodes(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, NODES, ctx.client.list_cluster::<Node>()).await else {
        return;
    };
    let now = Utc::now();
    for node in &items {
        if let Some(metric) = node_metric(node, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub fn node_metric(node: &Node, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&node.metadata)?;
    let status = node.status.as_ref();

    let metric = Metric::new(NODE_MEASUREMENT, now).tag("node_name", name);
    let metric = resource_fields(metric, "capacity", status.and_then(|s| s.capacity.as_ref()));
    let metric = resource_fields(metric, "allocatable", status.and_then(|s| s.allocatable.as_ref()));
    if metric.fields.is_empty() {
        return None;
    }
    Some(metric)
}

fn resource_fields(mut metric: Metric, prefix: &str, resources: Option<&BTreeMap<String, Quantity>>) -> Metric {
    let Some(resources) = resources else {
        return metric;
    };

    if let Some(millicores) = resources.get("cpu").and_then(|q| parse_cpu_to_millicores(&q.0)) {
        metric = metric
            .field(&format!("{}_cpu_cores", prefix), millicores / 1000)
            .field(&format!("{}_millicpu_cores", prefix), millicores);
    }
    if let Some(bytes) = resources.get("memory").and_then(|q| parse_memory_to_bytes(&q.0)) {
        metric = metric.field(&format!("{}_memory_bytes", prefix), bytes);
    }
    if let Some(pods) = resources.get("pods").and_then(|q| q.0.trim().parse::<i64>().ok()) {
        metric = metric.field(&format!("{}_pods", prefix), pods);
    }
    metric
}
