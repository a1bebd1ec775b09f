use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{PersistentVolume, PersistentVolumeClaim};

use super::base::{list_or_report, name_of, namespace_of, with_selector_tags};
use super::{PERSISTENT_VOLUMES, PERSISTENT_VOLUME_CLAIMS};
use crate::client::InventoryClient;
use crate::collector::CollectContext;
use crate::types::{Metric, PERSISTENT_VOLUME_CLAIM_MEASUREMENT, PERSISTENT_VOLUME_MEASUREMENT};

pub async fn collect_persistent_volumes(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(&ctx, PERSISTENT_VOLUMES, ctx.client.list_cluster::<PersistentVolume>()).await
    else {
        return;
    };
    let now = Utc::now();
    for pv in &items {
        if let Some(metric) = persistent_volume_metric(pv, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub async fn collect_persistent_volume_claims(ctx: CollectContext<InventoryClient>) {
    let Some(items) = list_or_report(
        &ctx,
        PERSISTENT_VOLUME_CLAIMS,
        ctx.client.list_namespaced::<PersistentVolumeClaim>(),
    )
    .await
    else {
        return;
    };
    let now = Utc::now();
    for pvc in &items {
        if let Some(metric) = persistent_volume_claim_metric(pvc, now) {
            ctx.acc.add_metric(metric);
        }
    }
}

pub fn persistent_volume_metric(pv: &PersistentVolume, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&pv.metadata)?;
    let phase = pv
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("unknown")
        .to_lowercase();
    let storage_class = pv
        .spec
        .as_ref()
        .and_then(|s| s.storage_class_name.as_deref())
        .unwrap_or("");

    Some(
        Metric::new(PERSISTENT_VOLUME_MEASUREMENT, now)
            .tag("pv_name", name)
            .tag("storageclass", storage_class)
            .field("phase_type", volume_phase_type(&phase))
            .tag("phase", phase),
    )
}

pub fn persistent_volume_claim_metric(pvc: &PersistentVolumeClaim, now: DateTime<Utc>) -> Option<Metric> {
    let name = name_of(&pvc.metadata)?;
    let phase = pvc
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("unknown")
        .to_lowercase();
    let spec = pvc.spec.as_ref();
    let storage_class = spec.and_then(|s| s.storage_class_name.as_deref()).unwrap_or("");

    let metric = Metric::new(PERSISTENT_VOLUME_CLAIM_MEASUREMENT, now)
        .tag("pvc_name", name)
        .tag("namespace", namespace_of(&pvc.metadata))
        .tag("storageclass", storage_class)
        .field("phase_type", claim_phase_type(&phase))
        .tag("phase", phase);
    Some(with_selector_tags(metric, spec.and_then(|s| s.selector.as_ref())))
}

fn volume_phase_type(phase: &str) -> i64 {
    match phase {
        "bound" => 0,
        "failed" => 1,
        "pending" => 2,
        "released" => 3,
        "available" => 4,
        _ => 5,
    }
}

fn claim_phase_type(phase: &str) -> i64 {
    match phase {
        "bound" => 0,
        "lost" => 1,
        "pending" => 2,
        _ => 3,
    }
}
