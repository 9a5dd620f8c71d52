use crate::core::normalize::SourceDialect;
use crate::core::ConfigProvider;
use crate::domain::model::{FilterState, Role};
use crate::domain::params::{AggregationParams, MarketWorthParams};
use crate::utils::error::{ObservatoryError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:5000/api/data";
pub const DEFAULT_BASEMAP_ENDPOINT: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Resolved settings of a run. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub filters: FilterState,
    pub dashboard: DashboardConfig,
    pub aggregation: AggregationParams,
    pub market_worth: MarketWorthParams,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub basemap_endpoint: String,
    pub timeout_seconds: u64,
    pub dialect: SourceDialect,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            basemap_endpoint: DEFAULT_BASEMAP_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            dialect: SourceDialect::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Role shown in the role drift chart; picked from the data when unset.
    pub drift_role: Option<Role>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    pub output_path: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ObservatoryError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_HOST})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ObservatoryError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("source.endpoint", &self.source.endpoint)?;
        validate_url("source.basemap_endpoint", &self.source.basemap_endpoint)?;
        validate_positive_number(
            "source.timeout_seconds",
            self.source.timeout_seconds as usize,
            1,
        )?;
        validate_path("load.output_path", &self.load.output_path)?;

        validate_range("filters.min_salary", self.filters.min_salary, 0.0, f64::MAX)?;

        let agg = &self.aggregation;
        validate_positive_number("aggregation.max_months", agg.max_months, 1)?;
        validate_positive_number("aggregation.drift_max_series", agg.drift_max_series, 1)?;
        validate_positive_number(
            "aggregation.role_drift_max_series",
            agg.role_drift_max_series,
            1,
        )?;
        validate_positive_number("aggregation.top_n", agg.top_n, 1)?;
        validate_positive_number("aggregation.skill_chip_count", agg.skill_chip_count, 1)?;
        validate_non_empty_list("aggregation.tracked_technologies", &agg.tracked_technologies)?;
        validate_non_empty_list("aggregation.role_drift_skills", &agg.role_drift_skills)?;

        let mw = &self.market_worth;
        validate_range("market_worth.match_threshold", mw.match_threshold, 0.0, 1.0)?;
        validate_range("market_worth.affinity_match", mw.affinity_match, 0.0, f64::MAX)?;
        validate_range(
            "market_worth.affinity_mismatch",
            mw.affinity_mismatch,
            0.0,
            f64::MAX,
        )?;
        validate_positive_number("market_worth.histogram_bins", mw.histogram_bins, 1)?;

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn basemap_endpoint(&self) -> &str {
        &self.source.basemap_endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn timeout_seconds(&self) -> u64 {
        self.source.timeout_seconds
    }

    fn dialect(&self) -> SourceDialect {
        self.source.dialect
    }

    fn filters(&self) -> &FilterState {
        &self.filters
    }

    fn drift_role(&self) -> Option<Role> {
        self.dashboard.drift_role
    }

    fn aggregation(&self) -> &AggregationParams {
        &self.aggregation
    }

    fn market_worth(&self) -> &MarketWorthParams {
        &self.market_worth
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
