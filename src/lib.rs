pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{HttpBasemapSource, HttpJobSource, LocalStorage};
pub use core::{dashboard::Dashboard, engine::ObservatoryEngine, pipeline::ObservatoryPipeline};
pub use utils::error::{ObservatoryError, Result};
