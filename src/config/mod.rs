pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::core::normalize::SourceDialect;
#[cfg(feature = "cli")]
use crate::domain::model::{DateRange, ExperienceBracket, Role};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

/// Command-line flags. Anything given here overrides the TOML file.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "job-observatory")]
#[command(about = "Fetches job postings and computes the job-market dashboard")]
pub struct CliConfig {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub api_endpoint: Option<String>,

    #[arg(long)]
    pub basemap_endpoint: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// How list and flag fields of the source are encoded
    #[arg(long, value_enum)]
    pub dialect: Option<SourceDialect>,

    /// Case-insensitive search in title and description
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub min_salary: Option<f64>,

    #[arg(long, value_enum)]
    pub date_range: Option<DateRange>,

    #[arg(long)]
    pub hybrid_only: bool,

    #[arg(long)]
    pub visa_only: bool,

    #[arg(long = "country", value_delimiter = ',')]
    pub countries: Vec<String>,

    #[arg(long = "role", value_delimiter = ',')]
    pub roles: Vec<Role>,

    #[arg(long = "seniority", value_delimiter = ',')]
    pub seniorities: Vec<String>,

    /// Skill chip; repeat for several, all must be present
    #[arg(long = "skill", value_delimiter = ',')]
    pub skills: Vec<String>,

    #[arg(long)]
    pub drift_role: Option<Role>,

    /// Skill of the market-worth profile
    #[arg(long = "mmw-skill", value_delimiter = ',')]
    pub mmw_skills: Vec<String>,

    #[arg(long, value_enum)]
    pub experience: Option<ExperienceBracket>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Show the resolved configuration without fetching anything
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// File settings (or defaults) with the flags applied on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(endpoint) = &self.api_endpoint {
            config.source.endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.basemap_endpoint {
            config.source.basemap_endpoint = endpoint.clone();
        }
        if let Some(path) = &self.output_path {
            config.load.output_path = path.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.source.timeout_seconds = timeout;
        }
        if let Some(dialect) = self.dialect {
            config.source.dialect = dialect;
        }

        let filters = &mut config.filters;
        if let Some(text) = &self.text {
            filters.text = text.clone();
        }
        if let Some(min_salary) = self.min_salary {
            filters.min_salary = min_salary;
        }
        if let Some(range) = self.date_range {
            filters.date_range = range;
        }
        filters.hybrid_only |= self.hybrid_only;
        filters.visa_only |= self.visa_only;
        if !self.countries.is_empty() {
            filters.countries = self.countries.clone();
        }
        if !self.roles.is_empty() {
            filters.roles = self.roles.clone();
        }
        if !self.seniorities.is_empty() {
            filters.seniorities = self.seniorities.clone();
        }
        if !self.skills.is_empty() {
            filters.set_skills(&self.skills);
        }

        if let Some(role) = self.drift_role {
            config.dashboard.drift_role = Some(role);
        }
        if !self.mmw_skills.is_empty() {
            config.market_worth.skills = self.mmw_skills.clone();
        }
        if let Some(experience) = self.experience {
            config.market_worth.experience = experience;
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_parse() {
        let cli = CliConfig::parse_from([
            "job-observatory",
            "--api-endpoint",
            "https://jobs.example.com/api/data",
            "--date-range",
            "60",
            "--role",
            "Data Analyst,ml engineer",
            "--skill",
            "SQL",
            "--skill",
            "python",
            "--experience",
            "mid",
            "--hybrid-only",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.api_endpoint(), "https://jobs.example.com/api/data");
        assert_eq!(config.filters.date_range, DateRange::Last60);
        assert_eq!(config.filters.roles, vec![Role::DataAnalyst, Role::MlEngineer]);
        assert_eq!(config.filters.skills.len(), 2);
        assert!(config.filters.skills.contains("sql"));
        assert!(config.filters.hybrid_only);
        assert_eq!(config.market_worth.experience, ExperienceBracket::Mid);
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"[source]\nendpoint = \"https://file.example.com/api/data\"\ntimeout_seconds = 7\n\n[filters]\ncountries = [\"France\"]\n",
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "job-observatory",
            "--config",
            file.path().to_str().unwrap(),
            "--country",
            "Spain,Germany",
            "--output-path",
            "./cli-output",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.source.endpoint, "https://file.example.com/api/data");
        assert_eq!(config.timeout_seconds(), 7);
        assert_eq!(config.filters.countries, vec!["Spain", "Germany"]);
        assert_eq!(config.output_path(), "./cli-output");
    }

    #[test]
    fn test_repeated_skill_flag_keeps_the_chip() {
        let cli = CliConfig::parse_from(["job-observatory", "--skill", "sql", "--skill", "SQL"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.filters.skills.len(), 1);
        assert!(config.filters.skills.contains("sql"));
    }

    #[test]
    fn test_unknown_role_flag_is_rejected() {
        let parsed = CliConfig::try_parse_from(["job-observatory", "--drift-role", "Astronaut"]);
        assert!(parsed.is_err());
    }
}
