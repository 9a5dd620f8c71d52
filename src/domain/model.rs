use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// 預設的國家 / 年資值
pub const NOT_SPECIFIED: &str = "Not specified";

/// One job posting exactly as the data endpoint returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    pub data: HashMap<String, Value>,
}

impl RawRecord {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }

    /// Trimmed, non-empty text of a scalar field. Numbers are stringified.
    pub fn text(&self, key: &str) -> Option<String> {
        let raw = match self.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if raw.is_empty() {
            None
        } else {
            Some(raw)
        }
    }

    /// First key that yields text, e.g. `title` then `job_title`.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.text(k))
    }
}

impl From<serde_json::Map<String, Value>> for RawRecord {
    fn from(obj: serde_json::Map<String, Value>) -> Self {
        Self {
            data: obj.into_iter().collect(),
        }
    }
}

/// List-valued fields arrive either as JSON arrays or as delimited strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawList {
    List(Vec<String>),
    Delimited(String),
}

impl RawList {
    pub fn from_value(value: Option<&Value>) -> Option<Self> {
        match value? {
            Value::Array(items) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                    .collect(),
            )),
            Value::String(s) => Some(Self::Delimited(s.clone())),
            Value::Number(n) => Some(Self::Delimited(n.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Analytics Engineer")]
    AnalyticsEngineer,
    #[serde(rename = "Data Engineer")]
    DataEngineer,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "BI / Analytics")]
    BiAnalytics,
    #[serde(rename = "ML Engineer")]
    MlEngineer,
    #[serde(rename = "Other data role")]
    Other,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::AnalyticsEngineer,
        Role::DataEngineer,
        Role::DataScientist,
        Role::DataAnalyst,
        Role::BiAnalytics,
        Role::MlEngineer,
        Role::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::AnalyticsEngineer => "Analytics Engineer",
            Role::DataEngineer => "Data Engineer",
            Role::DataScientist => "Data Scientist",
            Role::DataAnalyst => "Data Analyst",
            Role::BiAnalytics => "BI / Analytics",
            Role::MlEngineer => "ML Engineer",
            Role::Other => "Other data role",
        }
    }

    /// Ordered substring rules over the lowercased title; the first hit wins.
    pub fn classify(title: Option<&str>) -> Role {
        let t = match title {
            Some(t) if !t.is_empty() => t.to_lowercase(),
            _ => return Role::Other,
        };
        if t.contains("analytics engineer") {
            Role::AnalyticsEngineer
        } else if t.contains("engineer") {
            Role::DataEngineer
        } else if t.contains("scientist") {
            Role::DataScientist
        } else if t.contains("analytics") || t.contains("analyst") {
            Role::DataAnalyst
        } else if t.contains("business intelligence") || t.contains("bi ") {
            Role::BiAnalytics
        } else if t.contains("machine learning") || t.contains("ml ") {
            Role::MlEngineer
        } else {
            Role::Other
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Role::ALL
            .into_iter()
            .find(|r| r.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let labels: Vec<&str> = Role::ALL.iter().map(|r| r.label()).collect();
                format!("unknown role '{}', expected one of: {}", wanted, labels.join(", "))
            })
    }
}

/// A posting after normalization. Only postings with a parseable date exist in this form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub posted_date: NaiveDate,
    pub month: NaiveDate,
    pub title: Option<String>,
    pub role: Role,
    pub company: Option<String>,
    pub description: Option<String>,
    pub seniority_level: String,
    pub source: Option<String>,
    pub technical_skills: BTreeSet<String>,
    pub tools_used: BTreeSet<String>,
    pub soft_skills: BTreeSet<String>,
    pub domains: BTreeSet<String>,
    pub hybrid_policy: bool,
    pub visa_sponsorship: bool,
    pub country: String,
    pub salary: Option<f64>,
    pub salary_type: String,
    pub salary_currency: String,
    pub experience_years: Option<f64>,
}

impl CanonicalRecord {
    /// Substring containment against skills and tools, so "power bi" finds "microsoft power bi".
    pub fn mentions(&self, needle: &str) -> bool {
        self.technical_skills
            .iter()
            .chain(self.tools_used.iter())
            .any(|s| s.contains(needle))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum DateRange {
    #[default]
    #[serde(rename = "all")]
    #[cfg_attr(feature = "cli", value(name = "all"))]
    All,
    #[serde(rename = "30")]
    #[cfg_attr(feature = "cli", value(name = "30"))]
    Last30,
    #[serde(rename = "60")]
    #[cfg_attr(feature = "cli", value(name = "60"))]
    Last60,
}

impl DateRange {
    pub fn days(self) -> Option<i64> {
        match self {
            DateRange::All => None,
            DateRange::Last30 => Some(30),
            DateRange::Last60 => Some(60),
        }
    }
}

/// Current dashboard filter selections. The default value matches every posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub text: String,
    pub min_salary: f64,
    pub date_range: DateRange,
    pub hybrid_only: bool,
    pub visa_only: bool,
    pub countries: Vec<String>,
    pub roles: Vec<Role>,
    pub seniorities: Vec<String>,
    /// Lowercased chip keys, matched exactly against the posting's skills.
    #[serde(deserialize_with = "deserialize_skill_keys")]
    pub skills: BTreeSet<String>,
}

fn skill_key(skill: &str) -> Option<String> {
    let key = skill.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

fn deserialize_skill_keys<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(raw.iter().filter_map(|s| skill_key(s)).collect())
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }

    /// Chip click: selects the skill, or deselects it when already selected.
    pub fn toggle_skill(&mut self, skill: &str) {
        let Some(key) = skill_key(skill) else {
            return;
        };
        if !self.skills.remove(&key) {
            self.skills.insert(key);
        }
    }

    /// Replaces the selected chips; repeats collapse into one.
    pub fn set_skills<I, T>(&mut self, skills: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.skills = skills.into_iter().filter_map(|s| skill_key(s.as_ref())).collect();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExperienceBracket {
    /// 0-1 years
    #[default]
    Junior,
    /// 2-4 years
    Mid,
    /// 5+ years
    Senior,
}

impl ExperienceBracket {
    pub fn contains(self, years: f64) -> bool {
        match self {
            ExperienceBracket::Junior => years <= 1.0,
            ExperienceBracket::Mid => (2.0..=4.0).contains(&years),
            ExperienceBracket::Senior => years >= 5.0,
        }
    }
}
