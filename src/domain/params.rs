use crate::domain::catalog::{to_owned_list, ROLE_DRIFT_SKILLS, TRACKED_TECHNOLOGIES};
use crate::domain::model::ExperienceBracket;
use serde::{Deserialize, Serialize};

/// Knobs of the aggregation layer. Defaults reproduce the dashboard's chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationParams {
    /// Time axis cap; the most recent months are kept.
    pub max_months: usize,
    pub drift_min_count: usize,
    pub drift_max_series: usize,
    pub role_drift_max_series: usize,
    pub top_n: usize,
    pub skill_chip_count: usize,
    pub tracked_technologies: Vec<String>,
    pub role_drift_skills: Vec<String>,
    /// Compute views over the full dataset when the filters match nothing.
    pub fallback_to_full_dataset: bool,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            max_months: 8,
            drift_min_count: 3,
            drift_max_series: 6,
            role_drift_max_series: 6,
            top_n: 10,
            skill_chip_count: 18,
            tracked_technologies: to_owned_list(TRACKED_TECHNOLOGIES),
            role_drift_skills: to_owned_list(ROLE_DRIFT_SKILLS),
            fallback_to_full_dataset: true,
        }
    }
}

/// Market-worth query plus its scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketWorthParams {
    pub skills: Vec<String>,
    pub experience: ExperienceBracket,
    /// Postings must score strictly above this.
    pub match_threshold: f64,
    /// Multiplier when the posting's experience falls in the selected bracket.
    pub affinity_match: f64,
    /// Multiplier when it falls outside.
    pub affinity_mismatch: f64,
    /// Minimum number of known salaries before a histogram is drawn.
    pub histogram_min_salaries: usize,
    pub histogram_bins: usize,
}

impl Default for MarketWorthParams {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            experience: ExperienceBracket::Junior,
            match_threshold: 0.3,
            affinity_match: 1.1,
            affinity_mismatch: 0.8,
            histogram_min_salaries: 5,
            histogram_bins: 10,
        }
    }
}
