use crate::core::dashboard::DashboardView;
use crate::core::overview::Overview;
use crate::domain::model::CanonicalRecord;
use crate::utils::error::{ObservatoryError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

pub const DASHBOARD_FILE: &str = "dashboard.json";
pub const FILTERED_CSV_FILE: &str = "filtered_jobs.csv";

/// What a run writes to `dashboard.json`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub generated_at: DateTime<Utc>,
    pub source_endpoint: String,
    pub fetched_postings: usize,
    pub dropped_undated: usize,
    pub dashboard: DashboardView,
    pub overview: Overview,
}

/// Flat row of `filtered_jobs.csv`; list fields are joined with `; `.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date_posted: NaiveDate,
    month: String,
    title: &'a str,
    role: &'a str,
    company: &'a str,
    country: &'a str,
    seniority_level: &'a str,
    source: &'a str,
    salary: Option<f64>,
    salary_type: &'a str,
    salary_currency: &'a str,
    experience_years: Option<f64>,
    hybrid_policy: bool,
    visa_sponsorship: bool,
    technical_skills: String,
    tools_used: String,
    soft_skills: String,
    domains: String,
}

fn join(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join("; ")
}

impl<'a> From<&'a CanonicalRecord> for CsvRow<'a> {
    fn from(r: &'a CanonicalRecord) -> Self {
        Self {
            date_posted: r.posted_date,
            month: r.month.format("%Y-%m").to_string(),
            title: r.title.as_deref().unwrap_or_default(),
            role: r.role.label(),
            company: r.company.as_deref().unwrap_or_default(),
            country: &r.country,
            seniority_level: &r.seniority_level,
            source: r.source.as_deref().unwrap_or_default(),
            salary: r.salary,
            salary_type: &r.salary_type,
            salary_currency: &r.salary_currency,
            experience_years: r.experience_years,
            hybrid_policy: r.hybrid_policy,
            visa_sponsorship: r.visa_sponsorship,
            technical_skills: join(&r.technical_skills),
            tools_used: join(&r.tools_used),
            soft_skills: join(&r.soft_skills),
            domains: join(&r.domains),
        }
    }
}

/// CSV bytes of the given postings, header included even when empty.
pub fn filtered_csv(records: &[&CanonicalRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record([
        "date_posted",
        "month",
        "title",
        "role",
        "company",
        "country",
        "seniority_level",
        "source",
        "salary",
        "salary_type",
        "salary_currency",
        "experience_years",
        "hybrid_policy",
        "visa_sponsorship",
        "technical_skills",
        "tools_used",
        "soft_skills",
        "domains",
    ])?;
    for r in records {
        writer.serialize(CsvRow::from(*r))?;
    }
    writer
        .into_inner()
        .map_err(|e| ObservatoryError::IoError(e.into_error()))
}

pub fn report_json(report: &DashboardReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}
