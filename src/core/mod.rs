pub mod chart;
pub mod engine;
pub mod pareto;
pub mod schema;
pub mod transformer;
pub mod validator;

pub use crate::domain::model::{Record, RecordSet, TransformResult, WorkingRow};
pub use crate::domain::ports::{ChartRenderer, RecordSource, Storage};
pub use crate::utils::error::Result;
