use crate::domain::model::{CanonicalRecord, RawList, RawRecord, Role, NOT_SPECIFIED};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const HYBRID_TRUTHY: &[&str] = &["true", "yes", "hybrid", "remote"];
pub const VISA_TRUTHY: &[&str] = &["true", "yes"];
/// Vocabulary of the overview export, shared by both flags there.
pub const OVERVIEW_TRUTHY: &[&str] = &["true", "1", "yes", "y", "oui"];

/// Which upstream producer serialized the rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SourceDialect {
    /// Lists are arrays or plain `;` `,` `|` delimited strings.
    #[default]
    Observatory,
    /// Lists may also be wrapped like `['Python', 'SQL']` or `{Python,SQL}`.
    Overview,
}

impl SourceDialect {
    fn hybrid_truthy(self) -> &'static [&'static str] {
        match self {
            SourceDialect::Observatory => HYBRID_TRUTHY,
            SourceDialect::Overview => OVERVIEW_TRUTHY,
        }
    }

    fn visa_truthy(self) -> &'static [&'static str] {
        match self {
            SourceDialect::Observatory => VISA_TRUTHY,
            SourceDialect::Overview => OVERVIEW_TRUTHY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<CanonicalRecord>,
    pub dropped_undated: usize,
}

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a, %d %b %Y",
];

/// Strict `YYYY-MM-DD`, then strict `YYYY-MM-DDTHH:MM:SSZ`, then a generic parse.
pub fn parse_posted_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ") {
        return Some(dt.date());
    }

    parse_generic_date(raw)
}

fn parse_generic_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    GENERIC_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            GENERIC_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn is_list_delimiter(c: char) -> bool {
    matches!(c, ';' | ',' | '|')
}

fn clean_token(token: &str) -> Option<String> {
    let t = token.trim().to_lowercase();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

pub fn normalize_list(raw: Option<RawList>, dialect: SourceDialect) -> BTreeSet<String> {
    match raw {
        None => BTreeSet::new(),
        Some(RawList::List(items)) => items.iter().filter_map(|s| clean_token(s)).collect(),
        Some(RawList::Delimited(s)) => match dialect {
            SourceDialect::Observatory => s.split(is_list_delimiter).filter_map(clean_token).collect(),
            SourceDialect::Overview => {
                let s = s.trim();
                if s == "[]" || s == "{}" {
                    return BTreeSet::new();
                }
                let unwrapped = s
                    .trim_start_matches(|c: char| c.is_whitespace() || c == '[' || c == '{')
                    .trim_end_matches(|c: char| c.is_whitespace() || c == ']' || c == '}');
                unwrapped
                    .split(is_list_delimiter)
                    .filter_map(|token| {
                        let unquoted: String =
                            token.chars().filter(|c| *c != '\'' && *c != '"').collect();
                        clean_token(&unquoted)
                    })
                    .collect()
            }
        },
    }
}

/// Native booleans pass through; strings and numbers must be in `truthy` (case-insensitive).
pub fn normalize_flag(value: Option<&Value>, truthy: &[&str]) -> bool {
    let text = match value {
        Some(Value::Bool(b)) => return *b,
        Some(Value::String(s)) => s.trim().to_lowercase(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return false,
    };
    truthy.contains(&text.as_str())
}

/// Permissive numeric parse; anything non-finite is absent, never zero.
pub fn parse_number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

/// Returns `None` when the posting has no usable date.
pub fn normalize_record(raw: &RawRecord, dialect: SourceDialect) -> Option<CanonicalRecord> {
    let posted_date = raw.text("date_posted").and_then(|d| parse_posted_date(&d))?;
    let title = raw.first_text(&["title", "job_title"]);
    let role = Role::classify(title.as_deref());
    let list = |key: &str| normalize_list(RawList::from_value(raw.get(key)), dialect);

    Some(CanonicalRecord {
        posted_date,
        month: month_start(posted_date),
        role,
        company: raw.text("company"),
        description: raw.first_text(&["description_sans_html", "description"]),
        seniority_level: raw
            .text("seniority_level")
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        source: raw.text("source"),
        technical_skills: list("technical_skills"),
        tools_used: list("tools_used"),
        soft_skills: list("soft_skills"),
        domains: list("domains"),
        hybrid_policy: normalize_flag(raw.get("hybrid_policy"), dialect.hybrid_truthy()),
        visa_sponsorship: normalize_flag(raw.get("visa_sponsorship"), dialect.visa_truthy()),
        country: raw
            .text("country")
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        // 薪資 0 視為未知
        salary: parse_number(raw.get("salary_value")).filter(|v| *v != 0.0),
        salary_type: raw.text("salary_type").unwrap_or_default().to_lowercase(),
        salary_currency: raw
            .text("salary_currency")
            .unwrap_or_default()
            .to_uppercase(),
        experience_years: parse_number(raw.get("experience_years")),
        title,
    })
}

pub fn normalize_all(raw: &[RawRecord], dialect: SourceDialect) -> Normalized {
    let records: Vec<CanonicalRecord> = raw
        .iter()
        .filter_map(|r| normalize_record(r, dialect))
        .collect();
    let dropped_undated = raw.len() - records.len();

    if dropped_undated > 0 {
        tracing::debug!(
            "Dropped {} of {} postings without a parseable date_posted",
            dropped_undated,
            raw.len()
        );
    }

    Normalized {
        records,
        dropped_undated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_date_formats_in_order() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_posted_date("2024-03-15"), Some(expected));
        assert_eq!(parse_posted_date("2024-03-15T08:30:00Z"), Some(expected));
        assert_eq!(parse_posted_date("2024-03-15T08:30:00.123+00:00"), Some(expected));
        assert_eq!(parse_posted_date("2024-03-15 08:30:00"), Some(expected));
        assert_eq!(parse_posted_date("March 15, 2024"), Some(expected));
        assert_eq!(parse_posted_date("Fri, 15 Mar 2024 10:00:00 +0000"), Some(expected));
        assert_eq!(parse_posted_date("03/15/2024"), Some(expected));
        assert_eq!(parse_posted_date("not a date"), None);
        assert_eq!(parse_posted_date("2024-13-45"), None);
        assert_eq!(parse_posted_date(""), None);
    }

    #[test]
    fn test_month_start() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(month_start(d), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_list_and_delimited_forms_agree() {
        let from_list = normalize_list(
            RawList::from_value(Some(&json!(["SQL", " Python ", ""]))),
            SourceDialect::Observatory,
        );
        let from_string = normalize_list(
            RawList::from_value(Some(&json!("SQL, Python"))),
            SourceDialect::Observatory,
        );
        assert_eq!(from_list, set(&["sql", "python"]));
        assert_eq!(from_list, from_string);

        let mixed = normalize_list(
            Some(RawList::Delimited("Excel;Tableau|Looker,,".to_string())),
            SourceDialect::Observatory,
        );
        assert_eq!(mixed, set(&["excel", "tableau", "looker"]));
    }

    #[test]
    fn test_overview_dialect_unwraps_serialized_lists() {
        let python_repr = normalize_list(
            Some(RawList::Delimited("['Python', 'SQL']".to_string())),
            SourceDialect::Overview,
        );
        assert_eq!(python_repr, set(&["python", "sql"]));

        let pg_array = normalize_list(
            Some(RawList::Delimited("{Python,\"Power BI\"}".to_string())),
            SourceDialect::Overview,
        );
        assert_eq!(pg_array, set(&["python", "power bi"]));

        for empty in ["[]", "{}", "  "] {
            assert!(normalize_list(
                Some(RawList::Delimited(empty.to_string())),
                SourceDialect::Overview
            )
            .is_empty());
        }
    }

    #[test]
    fn test_flag_vocabularies_are_per_field() {
        for truthy in HYBRID_TRUTHY {
            assert!(normalize_flag(Some(&json!(truthy.to_uppercase())), HYBRID_TRUTHY));
        }
        for truthy in VISA_TRUTHY {
            assert!(normalize_flag(Some(&json!(truthy)), VISA_TRUTHY));
        }
        // "remote" means hybrid, not visa
        assert!(normalize_flag(Some(&json!("Remote")), HYBRID_TRUTHY));
        assert!(!normalize_flag(Some(&json!("Remote")), VISA_TRUTHY));
        assert!(normalize_flag(Some(&json!(true)), VISA_TRUTHY));
        assert!(!normalize_flag(Some(&json!(false)), HYBRID_TRUTHY));
        assert!(!normalize_flag(Some(&json!("on-site")), HYBRID_TRUTHY));
        assert!(!normalize_flag(None, HYBRID_TRUTHY));
        assert!(normalize_flag(Some(&json!(1)), OVERVIEW_TRUTHY));
        assert!(normalize_flag(Some(&json!("Oui")), OVERVIEW_TRUTHY));
    }

    #[test]
    fn test_parse_number_is_absent_not_zero() {
        assert_eq!(parse_number(Some(&json!("95000"))), Some(95000.0));
        assert_eq!(parse_number(Some(&json!(" 1e5 "))), Some(100000.0));
        assert_eq!(parse_number(Some(&json!(3.5))), Some(3.5));
        assert_eq!(parse_number(Some(&json!("95,000"))), None);
        assert_eq!(parse_number(Some(&json!("NaN"))), None);
        assert_eq!(parse_number(Some(&json!("inf"))), None);
        assert_eq!(parse_number(Some(&json!(""))), None);
        assert_eq!(parse_number(Some(&json!(null))), None);
        assert_eq!(parse_number(None), None);
    }

    #[test]
    fn test_normalize_example_posting() {
        let record = normalize_record(
            &raw(json!({
                "date_posted": "2024-03-15",
                "title": "Senior Data Analyst",
                "technical_skills": "SQL;Python",
                "hybrid_policy": "Remote",
                "salary_value": "95000"
            })),
            SourceDialect::Observatory,
        )
        .unwrap();

        assert_eq!(record.role, Role::DataAnalyst);
        assert_eq!(record.month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(record.technical_skills, set(&["sql", "python"]));
        assert!(record.hybrid_policy);
        assert!(!record.visa_sponsorship);
        assert_eq!(record.salary, Some(95000.0));
        assert_eq!(record.country, NOT_SPECIFIED);
        assert_eq!(record.seniority_level, NOT_SPECIFIED);
        assert_eq!(record.experience_years, None);
    }

    #[test]
    fn test_normalize_fallback_fields() {
        let record = normalize_record(
            &raw(json!({
                "date_posted": "2024-01-02T09:00:00Z",
                "job_title": "Data Scientist",
                "description": "Build models",
                "country": " France ",
                "salary_value": 0,
                "salary_type": "Annual",
                "salary_currency": "usd",
                "experience_years": "3"
            })),
            SourceDialect::Observatory,
        )
        .unwrap();

        assert_eq!(record.title.as_deref(), Some("Data Scientist"));
        assert_eq!(record.role, Role::DataScientist);
        assert_eq!(record.description.as_deref(), Some("Build models"));
        assert_eq!(record.country, "France");
        assert_eq!(record.salary, None);
        assert_eq!(record.salary_type, "annual");
        assert_eq!(record.salary_currency, "USD");
        assert_eq!(record.experience_years, Some(3.0));
    }

    #[test]
    fn test_undated_postings_are_dropped() {
        let rows = vec![
            raw(json!({"date_posted": "2024-03-15", "title": "Analyst"})),
            raw(json!({"date_posted": "someday", "title": "Analyst"})),
            raw(json!({"title": "Analyst"})),
        ];
        let normalized = normalize_all(&rows, SourceDialect::Observatory);
        assert_eq!(normalized.records.len(), 1);
        assert_eq!(normalized.dropped_undated, 2);
    }
}
