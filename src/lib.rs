pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{CliConfig, ColumnConfig, RosterConfig, TomlConfig};
pub use core::engine::{EtlOutcome, FaultEtlEngine};
pub use core::pareto::{Metric, ParetoEngine};
pub use core::schema::SchemaResolver;
pub use core::transformer::TransformPipeline;
pub use core::validator::RowValidator;
pub use utils::error::{FaultEtlError, Result};
