// 追蹤中的技術清單，以子字串比對

pub const TRACKED_TECHNOLOGIES: &[&str] = &[
    "sql",
    "python",
    "r",
    "excel",
    "tableau",
    "power bi",
    "powerbi",
    "looker",
    "looker studio",
    "snowflake",
    "bigquery",
    "redshift",
    "spark",
    "hadoop",
    "airflow",
    "dbt",
    "aws",
    "gcp",
    "azure",
    "saas",
    "llm",
    "generative ai",
    "machine learning",
];

/// Skills plotted per role in the role drift chart.
pub const ROLE_DRIFT_SKILLS: &[&str] = &[
    "sql",
    "python",
    "tableau",
    "power bi",
    "powerbi",
    "excel",
    "snowflake",
    "dbt",
    "airflow",
    "spark",
    "aws",
    "gcp",
    "azure",
];

/// Chips offered by the market-worth estimator.
pub const MARKET_WORTH_SKILLS: &[&str] = &[
    "sql",
    "python",
    "tableau",
    "power bi",
    "excel",
    "aws",
    "gcp",
    "snowflake",
    "dbt",
    "airflow",
];

pub fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
