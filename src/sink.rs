use anyhow::{anyhow, Context, Result};
use std::sync::Mutex;
use tracing::{error, warn};

use crate::error::CollectError;
use crate::types::{FieldValue, Metric};

/// Receiver of collected metrics. Shared by all collectors of a poll, so it
/// must accept concurrent writers.
pub trait Accumulator: Send + Sync {
    fn add_metric(&self, metric: Metric);

    fn add_error(&self, collector: &str, err: CollectError);
}

/// Accumulator that keeps everything in memory until drained.
#[derive(Debug, Default)]
pub struct BufferAccumulator {
    metrics: Mutex<Vec<Metric>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl BufferAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes all buffered metrics, leaving the buffer empty.
    pub fn drain(&self) -> Vec<Metric> {
        self.metrics
            .lock()
            .map(|mut m| std::mem::take(&mut *m))
            .unwrap_or_default()
    }

    /// Takes all buffered `(collector, message)` errors.
    pub fn drain_errors(&self) -> Vec<(String, String)> {
        self.errors
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl Accumulator for BufferAccumulator {
    fn add_metric(&self, metric: Metric) {
        match self.metrics.lock() {
            Ok(mut metrics) => metrics.push(metric),
            Err(_) => error!("metric buffer poisoned, dropping {}", metric.measurement),
        }
    }

    fn add_error(&self, collector: &str, err: CollectError) {
        warn!(collector = %collector, "collection failed: {}", err);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push((collector.to_string(), err.to_string()));
        }
    }
}

/// Renders a metric in InfluxDB line protocol with a nanosecond timestamp.
/// Returns `None` for a metric without fields, which the protocol cannot express.
pub fn to_line_protocol(metric: &Metric) -> Option<String> {
    if metric.fields.is_empty() {
        return None;
    }

    let mut line = escape(&metric.measurement, &[',', ' ']);
    for (k, v) in &metric.tags {
        if v.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape(k, &[',', '=', ' ']));
        line.push('=');
        line.push_str(&escape(v, &[',', '=', ' ']));
    }

    let fields: Vec<String> = metric
        .fields
        .iter()
        .map(|(k, v)| format!("{}={}", escape(k, &[',', '=', ' ']), format_field(v)))
        .collect();
    line.push(' ');
    line.push_str(&fields.join(","));

    line.push(' ');
    line.push_str(&metric.timestamp.timestamp_nanos_opt().unwrap_or_default().to_string());
    Some(line)
}

fn format_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Int(v) => format!("{}i", v),
        FieldValue::Float(v) => format!("{}", v),
        FieldValue::Bool(v) => format!("{}", v),
        FieldValue::Str(v) => format!("\"{}\"", escape(v, &['"', '\\'])),
    }
}

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Posts a batch of line-protocol lines to an HTTP write endpoint.
pub async fn write_lines(url: &str, lines: &[String]) -> Result<()> {
    let client = reqwest::Client::new();
    let res = client
        .post(url)
        .header("content-type", "text/plain; charset=utf-8")
        .body(lines.join("\n"))
        .send()
        .await
        .context("Failed to send metrics write request")?;
    if !res.status().is_success() {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        error!("metrics write failed: {} - {}", status, body);
        return Err(anyhow!("metrics endpoint returned non-success status {}", status));
    }
    Ok(())
}
