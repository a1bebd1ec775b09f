use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub const DAEMONSET_MEASUREMENT: &str = "kubernetes_daemonset";
pub const DEPLOYMENT_MEASUREMENT: &str = "kubernetes_deployment";
pub const NODE_MEASUREMENT: &str = "kubernetes_node";
pub const PERSISTENT_VOLUME_MEASUREMENT: &str = "kubernetes_persistentvolume";
pub const PERSISTENT_VOLUME_CLAIM_MEASUREMENT: &str = "kubernetes_persistentvolumeclaim";
pub const POD_CONTAINER_MEASUREMENT: &str = "kubernetes_pod_container";
pub const STATEFULSET_MEASUREMENT: &str = "kubernetes_statefulset";

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    /// Empty means all namespaces.
    pub namespace: String,
    /// Path to a bearer token file. Takes priority over `bearer_token_string`.
    pub bearer_token: Option<String>,
    pub bearer_token_string: Option<String>,
    pub response_timeout: Duration,
    pub resource_include: Vec<String>,
    pub resource_exclude: Vec<String>,
    /// Finished pods older than this are not reported.
    pub max_pod_age: Option<Duration>,
    pub tls: TlsConfig,
    pub poll_interval: Option<Duration>,
    pub output_url: Option<String>,
}

impl Config {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            bearer_token: None,
            bearer_token_string: None,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            resource_include: Vec::new(),
            resource_exclude: Vec::new(),
            max_pod_age: None,
            tls: TlsConfig::default(),
            poll_interval: None,
            output_url: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TlsConfig {
    pub ca_file: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// A single timestamped data point handed to an accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(measurement: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    pub fn tag(mut self, key: &str, value: impl Into<String>) -> Self {
        self.tags.insert(key.to_string(), value.into());
        self
    }

    pub fn field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn get_field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|s| s.as_str())
    }
}
