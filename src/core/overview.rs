use crate::core::aggregate::{category_counts, top_counts, CategoryCount, Dimension};
use crate::core::stats::{bin, extent, median, nice_domain, ticks, HistogramBin};
use crate::domain::model::{CanonicalRecord, NOT_SPECIFIED};
use serde::Serialize;
use std::collections::HashSet;

/// Values never shown in the overview bars and pies.
pub const SKIPPED_VALUES: &[&str] = &["", NOT_SPECIFIED, "nan"];
pub const SENIORITY_SLICES: usize = 5;
pub const OTHER_SLICE: &str = "Other";
/// Open salary bounds of the overview histogram.
pub const SALARY_HISTOGRAM_RANGE: (f64, f64) = (20_000.0, 600_000.0);
pub const SALARY_HISTOGRAM_TICKS: usize = 15;
/// Annual USD salaries must be above this to count in the headline median.
pub const KPI_SALARY_FLOOR: f64 = 1_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: usize,
}

impl PieSlice {
    fn new(name: &str, value: usize) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewKpis {
    pub total_postings: usize,
    pub distinct_companies: usize,
    pub median_usd_annual_salary: Option<f64>,
    /// `$95k`, or `N/A` without salaries.
    pub median_label: String,
}

/// The summary page: headline numbers, top-10 bars, pies and the salary histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub kpis: OverviewKpis,
    pub top_skills: Vec<CategoryCount>,
    pub top_tools: Vec<CategoryCount>,
    pub top_countries: Vec<CategoryCount>,
    pub top_domains: Vec<CategoryCount>,
    pub top_titles: Vec<CategoryCount>,
    pub top_companies: Vec<CategoryCount>,
    pub seniority: Vec<PieSlice>,
    pub source: Vec<PieSlice>,
    pub hybrid: Vec<PieSlice>,
    pub visa: Vec<PieSlice>,
    pub salary_histogram: Vec<HistogramBin>,
}

fn is_usd_annual(record: &CanonicalRecord) -> bool {
    matches!(record.salary_currency.as_str(), "USD" | "$")
        && (record.salary_type.contains("annual") || record.salary_type.contains("year"))
}

/// Known USD annual salaries strictly inside `(lo, hi)`.
pub fn usd_annual_salaries(records: &[&CanonicalRecord], lo: f64, hi: f64) -> Vec<f64> {
    records
        .iter()
        .filter(|r| is_usd_annual(r))
        .filter_map(|r| r.salary)
        .filter(|&s| s > lo && s < hi)
        .collect()
}

pub fn overview_kpis(records: &[&CanonicalRecord]) -> OverviewKpis {
    let companies: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.company.as_deref())
        .collect();
    let median_salary = median(&usd_annual_salaries(records, KPI_SALARY_FLOOR, f64::INFINITY));

    OverviewKpis {
        total_postings: records.len(),
        distinct_companies: companies.len(),
        median_usd_annual_salary: median_salary,
        median_label: match median_salary {
            Some(m) => format!("${:.0}k", m / 1000.0),
            None => "N/A".to_string(),
        },
    }
}

/// Top `keep` slices plus one `Other` slice with the remainder, when non-empty.
pub fn pie_with_other(ranked: &[CategoryCount], keep: usize) -> Vec<PieSlice> {
    let mut slices: Vec<PieSlice> = ranked
        .iter()
        .take(keep)
        .map(|c| PieSlice::new(&c.name, c.count))
        .collect();
    let rest: usize = ranked.iter().skip(keep).map(|c| c.count).sum();
    if rest > 0 {
        slices.push(PieSlice::new(OTHER_SLICE, rest));
    }
    slices
}

fn flag_pie(records: &[&CanonicalRecord], flag: fn(&CanonicalRecord) -> bool, labels: [&str; 2]) -> Vec<PieSlice> {
    let yes = records.iter().filter(|r| flag(r)).count();
    vec![
        PieSlice::new(labels[0], yes),
        PieSlice::new(labels[1], records.len() - yes),
    ]
}

/// Histogram with round thresholds over the nice extent of `(lo, hi)`-bounded salaries.
pub fn salary_histogram(records: &[&CanonicalRecord]) -> Vec<HistogramBin> {
    let (lo, hi) = SALARY_HISTOGRAM_RANGE;
    let salaries = usd_annual_salaries(records, lo, hi);
    let Some((min, max)) = extent(&salaries) else {
        return Vec::new();
    };
    let (x0, x1) = nice_domain(min, max, 10);
    let thresholds = ticks(x0, x1, SALARY_HISTOGRAM_TICKS);
    bin(&salaries, x0, x1, &thresholds)
}

pub fn build_overview(records: &[&CanonicalRecord], top_n: usize) -> Overview {
    let top = |dimension| top_counts(records, dimension, SKIPPED_VALUES, top_n);

    let seniority = category_counts(records, Dimension::Seniority, SKIPPED_VALUES);
    let source = category_counts(records, Dimension::Source, SKIPPED_VALUES);

    Overview {
        kpis: overview_kpis(records),
        top_skills: top(Dimension::TechnicalSkills),
        top_tools: top(Dimension::ToolsUsed),
        top_countries: top(Dimension::Country),
        top_domains: top(Dimension::Domains),
        top_titles: top(Dimension::Title),
        top_companies: top(Dimension::Company),
        seniority: pie_with_other(&seniority, SENIORITY_SLICES),
        source: if source.is_empty() {
            Vec::new()
        } else {
            // 來源圓餅圖只保留最大來源
            let mut slices = pie_with_other(&source, 1);
            if slices.len() == 1 {
                slices.push(PieSlice::new(OTHER_SLICE, 0));
            }
            slices
        },
        hybrid: flag_pie(records, |r| r.hybrid_policy, ["Hybrid/Remote", "On-site"]),
        visa: flag_pie(records, |r| r.visa_sponsorship, ["Visa OK", "Visa No"]),
        salary_histogram: salary_histogram(records),
    }
}
