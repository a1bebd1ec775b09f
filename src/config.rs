use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::time::Duration;

use crate::parsing::{parse_duration, parse_list};
use crate::types::{Config, TlsConfig, DEFAULT_NAMESPACE, DEFAULT_RESPONSE_TIMEOUT};

/// Trait for abstracting environment variable access
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// Production implementation using std::env
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Mock implementation for testing
#[derive(Debug, Default)]
pub struct MockEnvironment {
    vars: HashMap<String, String>,
}

impl MockEnvironment {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    pub fn set_var<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_var<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.set_var(key, value);
        self
    }
}

impl EnvironmentProvider for MockEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn load_config() -> Result<Config> {
    load_config_with_env(&SystemEnvironment)
}

pub fn load_config_with_env<E: EnvironmentProvider>(env: &E) -> Result<Config> {
    let url = non_empty(env, "KUBE_URL")
        .ok_or_else(|| anyhow!("KUBE_URL env var must be set to the kubernetes api url"))?;

    // An explicitly empty namespace selects all namespaces
    let namespace = env
        .get_var("KUBE_NAMESPACE")
        .map(|ns| ns.trim().to_string())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    let response_timeout =
        duration_var(env, "KUBE_RESPONSE_TIMEOUT")?.unwrap_or(DEFAULT_RESPONSE_TIMEOUT);

    let tls = TlsConfig {
        ca_file: non_empty(env, "TLS_CA"),
        cert_file: non_empty(env, "TLS_CERT"),
        key_file: non_empty(env, "TLS_KEY"),
        insecure_skip_verify: env
            .get_var("INSECURE_SKIP_VERIFY")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
            .unwrap_or(false),
    };

    Ok(Config {
        url,
        namespace,
        bearer_token: non_empty(env, "KUBE_BEARER_TOKEN"),
        bearer_token_string: non_empty(env, "KUBE_BEARER_TOKEN_STRING"),
        response_timeout,
        resource_include: env.get_var("RESOURCE_INCLUDE").map(|v| parse_list(&v)).unwrap_or_default(),
        resource_exclude: env.get_var("RESOURCE_EXCLUDE").map(|v| parse_list(&v)).unwrap_or_default(),
        max_pod_age: duration_var(env, "MAX_POD_AGE")?,
        tls,
        poll_interval: duration_var(env, "POLL_INTERVAL")?,
        output_url: non_empty(env, "OUTPUT_URL"),
    })
}

fn non_empty<E: EnvironmentProvider>(env: &E, key: &str) -> Option<String> {
    env.get_var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn duration_var<E: EnvironmentProvider>(env: &E, key: &str) -> Result<Option<Duration>> {
    match non_empty(env, key) {
        None => Ok(None),
        Some(raw) => parse_duration(&raw)
            .map(Some)
            .ok_or_else(|| anyhow!("Invalid {}: '{}' (expected e.g. 500ms, 5s, 1m, 1h)", key, raw)),
    }
}
