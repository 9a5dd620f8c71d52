use crate::domain::model::{CanonicalRecord, Role};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriftSeries {
    pub key: String,
    pub total: usize,
    pub values: Vec<MonthCount>,
}

/// Per-category monthly counts over a shared time axis, ranked by total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftChart {
    pub months: Vec<NaiveDate>,
    pub series: Vec<DriftSeries>,
}

/// Field a grouping reads from each posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Role,
    Country,
    Seniority,
    Source,
    Title,
    Company,
    TechnicalSkills,
    ToolsUsed,
    SoftSkills,
    Domains,
}

impl Dimension {
    pub fn values<'r>(self, record: &'r CanonicalRecord) -> Vec<&'r str> {
        let set = |s: &'r BTreeSet<String>| -> Vec<&'r str> { s.iter().map(String::as_str).collect() };
        match self {
            Dimension::Role => vec![record.role.label()],
            Dimension::Country => vec![record.country.trim()],
            Dimension::Seniority => vec![record.seniority_level.as_str()],
            Dimension::Source => record.source.as_deref().into_iter().collect(),
            Dimension::Title => record.title.as_deref().into_iter().collect(),
            Dimension::Company => record.company.as_deref().into_iter().collect(),
            Dimension::TechnicalSkills => set(&record.technical_skills),
            Dimension::ToolsUsed => set(&record.tools_used),
            Dimension::SoftSkills => set(&record.soft_skills),
            Dimension::Domains => set(&record.domains),
        }
    }
}

/// Which months a drift chart spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthWindow {
    All,
    /// The most recent `n` distinct months.
    Last(usize),
}

impl MonthWindow {
    fn select(self, months: Vec<NaiveDate>) -> Vec<NaiveDate> {
        match self {
            MonthWindow::Last(n) if months.len() > n => months[months.len() - n..].to_vec(),
            _ => months,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftSpec {
    pub window: MonthWindow,
    pub min_count: usize,
    pub max_series: usize,
}

/// Distinct months present, ascending.
pub fn months_present(records: &[&CanonicalRecord]) -> Vec<NaiveDate> {
    records
        .iter()
        .map(|r| r.month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn monthly_volume(records: &[&CanonicalRecord]) -> Vec<MonthCount> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.month).or_insert(0) += 1;
    }
    let mut volume: Vec<MonthCount> = counts
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect();
    volume.sort_by_key(|m| m.month);
    volume
}

/// Drift of any dimension; a posting counts once per distinct value per month.
pub fn drift_by_dimension(
    records: &[&CanonicalRecord],
    dimension: Dimension,
    spec: DriftSpec,
) -> DriftChart {
    let months = spec.window.select(months_present(records));
    let in_window: HashSet<NaiveDate> = months.iter().copied().collect();

    let mut hits: Vec<(&str, NaiveDate)> = Vec::new();
    for r in records.iter().filter(|r| in_window.contains(&r.month)) {
        let mut seen = HashSet::new();
        for value in dimension.values(r) {
            if !value.is_empty() && seen.insert(value) {
                hits.push((value, r.month));
            }
        }
    }

    let series = rank_series(&months, hits, spec);
    DriftChart { months, series }
}

/// Drift of allow-listed technologies, matched by substring against skills and tools.
pub fn tracked_drift(
    records: &[&CanonicalRecord],
    tracked: &[String],
    spec: DriftSpec,
) -> DriftChart {
    let months = spec.window.select(months_present(records));
    let in_window: HashSet<NaiveDate> = months.iter().copied().collect();

    let mut hits: Vec<(&str, NaiveDate)> = Vec::new();
    for r in records.iter().filter(|r| in_window.contains(&r.month)) {
        let mut seen = HashSet::new();
        for tech in tracked {
            if seen.insert(tech.as_str()) && r.mentions(tech) {
                hits.push((tech.as_str(), r.month));
            }
        }
    }

    let series = rank_series(&months, hits, spec);
    DriftChart { months, series }
}

/// Tracked-skill drift restricted to one role; the time axis comes from that role's postings.
pub fn role_skill_drift(
    records: &[&CanonicalRecord],
    role: Role,
    tracked: &[String],
    spec: DriftSpec,
) -> DriftChart {
    let role_records: Vec<&CanonicalRecord> =
        records.iter().copied().filter(|r| r.role == role).collect();
    tracked_drift(&role_records, tracked, spec)
}

fn rank_series(months: &[NaiveDate], hits: Vec<(&str, NaiveDate)>, spec: DriftSpec) -> Vec<DriftSeries> {
    let mut order: Vec<&str> = Vec::new();
    let mut per_key: HashMap<&str, HashMap<NaiveDate, usize>> = HashMap::new();
    for (key, month) in hits {
        let by_month = per_key.entry(key).or_insert_with(|| {
            order.push(key);
            HashMap::new()
        });
        *by_month.entry(month).or_insert(0) += 1;
    }

    let mut series: Vec<DriftSeries> = order
        .into_iter()
        .map(|key| {
            let by_month = &per_key[key];
            let values: Vec<MonthCount> = months
                .iter()
                .map(|&month| MonthCount {
                    month,
                    count: by_month.get(&month).copied().unwrap_or(0),
                })
                .collect();
            DriftSeries {
                key: key.to_string(),
                total: values.iter().map(|v| v.count).sum(),
                values,
            }
        })
        .filter(|s| s.total > 0 && s.total >= spec.min_count)
        .collect();

    series.sort_by(|a, b| b.total.cmp(&a.total));
    series.truncate(spec.max_series);
    series
}

/// Occurrences per value, most frequent first; ties keep first-seen order.
pub fn category_counts(
    records: &[&CanonicalRecord],
    dimension: Dimension,
    skip: &[&str],
) -> Vec<CategoryCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        for value in dimension.values(r) {
            let value = value.trim();
            if value.is_empty() || skip.contains(&value) {
                continue;
            }
            let count = counts.entry(value).or_insert_with(|| {
                order.push(value);
                0
            });
            *count += 1;
        }
    }

    let mut ranked: Vec<CategoryCount> = order
        .into_iter()
        .map(|name| CategoryCount {
            name: name.to_string(),
            count: counts[name],
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

pub fn top_counts(
    records: &[&CanonicalRecord],
    dimension: Dimension,
    skip: &[&str],
    limit: usize,
) -> Vec<CategoryCount> {
    let mut ranked = category_counts(records, dimension, skip);
    ranked.truncate(limit);
    ranked
}
