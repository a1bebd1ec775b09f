// Public modules
pub mod types;
pub mod config;
pub mod parsing;
pub mod error;
pub mod client;
pub mod sink;
pub mod collector;
pub mod metrics;

// Re-export commonly used items
pub use types::*;
pub use config::{load_config, load_config_with_env, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_cpu_to_millicores, parse_memory_to_bytes, parse_duration, parse_list};
pub use error::{ClientError, CollectError, GatherError, SelectError};
pub use client::{load_bearer_token, Connect, InventoryClient, KubeConnector};
pub use sink::{Accumulator, BufferAccumulator};
pub use collector::{select, CollectContext, CollectFn, CollectorRegistry, Gatherer, PollSummary};
pub use metrics::default_registry;
