pub mod aggregate;
pub mod dashboard;
pub mod engine;
pub mod export;
pub mod filter;
pub mod geo;
pub mod kpi;
pub mod normalize;
pub mod overview;
pub mod pipeline;
pub mod stats;

pub use crate::domain::model::{CanonicalRecord, FilterState, RawRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
