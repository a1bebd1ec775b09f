use std::time::Duration;

/// Possible errors from building the inventory client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Bearer token file could not be read.
    #[error("failed to read bearer token file '{path}': {source}")]
    TokenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configured API url is not a valid URI.
    #[error("invalid kubernetes url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Failed to assemble client configuration (TLS material, kubeconfig).
    #[error("failed to process client configuration: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Failed to build kubernetes client.
    #[error("failed to build kubernetes client: {0}")]
    Kube(#[from] kube::Error),

    #[error("failed to build client configuration: {0}")]
    Other(String),
}

/// Errors from resolving which collectors run.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("unknown resource kind '{0}' in resource include list")]
    UnknownResource(String),
}

/// Errors that abort a whole poll. Collector failures never end up here.
#[derive(thiserror::Error, Debug)]
pub enum GatherError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Failure of a single collector, reported through the accumulator.
#[derive(thiserror::Error, Debug)]
pub enum CollectError {
    #[error("kubernetes api error: {0}")]
    Api(#[from] kube::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("collection cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}
