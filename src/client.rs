use k8s_openapi::{ClusterResourceScope, NamespaceResourceScope};
use kube::{
    api::ListParams,
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Resource,
};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, CollectError};
use crate::types::{Config, DEFAULT_NAMESPACE};

const KUBECONFIG_ENTRY: &str = "kube-inventory";

/// Builds the client shared by every collector.
pub trait Connect: Send + Sync + 'static {
    type Client: Clone + Send + Sync + 'static;

    fn connect(&self, cfg: &Config) -> impl Future<Output = Result<Self::Client, ClientError>> + Send;
}

/// Production connector producing an [`InventoryClient`] backed by [`kube::Client`].
#[derive(Debug, Default, Clone, Copy)]
pub struct KubeConnector;

impl Connect for KubeConnector {
    type Client = InventoryClient;

    async fn connect(&self, cfg: &Config) -> Result<InventoryClient, ClientError> {
        let token = load_bearer_token(cfg)?;
        let kubeconfig = build_kubeconfig(cfg, token.as_deref())?;

        let mut config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        config.connect_timeout = Some(cfg.response_timeout);
        config.read_timeout = Some(cfg.response_timeout);

        let client = Client::try_from(config)?;
        debug!(url = %cfg.url, namespace = %cfg.namespace, "kubernetes client created");

        Ok(InventoryClient::new(client, &cfg.namespace, cfg.response_timeout))
    }
}

/// Resolves the bearer token. A token file wins over the literal token and
/// its content is trimmed of surrounding whitespace.
pub fn load_bearer_token(cfg: &Config) -> Result<Option<String>, ClientError> {
    if let Some(path) = cfg.bearer_token.as_deref() {
        let token = std::fs::read_to_string(path).map_err(|source| ClientError::TokenFile {
            path: path.to_string(),
            source,
        })?;
        return Ok(Some(token.trim().to_string()));
    }

    Ok(cfg.bearer_token_string.clone().filter(|t| !t.is_empty()))
}

/// Assembles an in-memory kubeconfig with a single cluster, user and context.
fn build_kubeconfig(cfg: &Config, token: Option<&str>) -> Result<Kubeconfig, ClientError> {
    let uri: http::Uri = cfg.url.parse().map_err(|e: http::uri::InvalidUri| ClientError::InvalidUrl {
        url: cfg.url.clone(),
        reason: e.to_string(),
    })?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(ClientError::InvalidUrl {
            url: cfg.url.clone(),
            reason: "scheme and host are required".to_string(),
        });
    }

    let namespace = if cfg.namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        cfg.namespace.as_str()
    };

    let raw = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": KUBECONFIG_ENTRY,
            "cluster": {
                "server": cfg.url,
                "certificate-authority": cfg.tls.ca_file,
                "insecure-skip-tls-verify": cfg.tls.insecure_skip_verify,
            }
        }],
        "users": [{
            "name": KUBECONFIG_ENTRY,
            "user": {
                "token": token,
                "client-certificate": cfg.tls.cert_file,
                "client-key": cfg.tls.key_file,
            }
        }],
        "contexts": [{
            "name": KUBECONFIG_ENTRY,
            "context": {
                "cluster": KUBECONFIG_ENTRY,
                "user": KUBECONFIG_ENTRY,
                "namespace": namespace,
            }
        }],
        "current-context": KUBECONFIG_ENTRY,
    });

    serde_json::from_value(raw).map_err(|e| ClientError::Other(e.to_string()))
}

/// Kubernetes client scoped to a namespace, with every list call bounded by
/// the response timeout.
#[derive(Clone)]
pub struct InventoryClient {
    client: Client,
    namespace: String,
    timeout: Duration,
}

impl InventoryClient {
    pub fn new(client: Client, namespace: &str, timeout: Duration) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            timeout,
        }
    }

    /// Configured namespace; empty means all namespaces.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lists every object of a namespaced kind in the configured namespace.
    pub async fn list_namespaced<K>(&self) -> Result<Vec<K>, CollectError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        let api: Api<K> = if self.namespace.is_empty() {
            Api::all(self.client.clone())
        } else {
            Api::namespaced(self.client.clone(), &self.namespace)
        };
        self.list(api).await
    }

    /// Lists every object of a cluster-scoped kind.
    pub async fn list_cluster<K>(&self) -> Result<Vec<K>, CollectError>
    where
        K: Resource<Scope = ClusterResourceScope> + Clone + DeserializeOwned + Debug,
        K::DynamicType: Default,
    {
        self.list(Api::all(self.client.clone())).await
    }

    async fn list<K>(&self, api: Api<K>) -> Result<Vec<K>, CollectError>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        match tokio::time::timeout(self.timeout, api.list(&ListParams::default())).await {
            Ok(list) => Ok(list?.items),
            Err(_) => Err(CollectError::Timeout(self.timeout)),
        }
    }
}
