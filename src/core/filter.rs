use crate::domain::catalog::{to_owned_list, MARKET_WORTH_SKILLS};
use crate::domain::model::{CanonicalRecord, FilterState, Role};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Checkbox options offered by the multi-select groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub countries: Vec<String>,
    pub roles: Vec<Role>,
    pub seniorities: Vec<String>,
    pub skill_chips: Vec<String>,
    /// Fixed chip list of the market-worth estimator.
    pub market_worth_chips: Vec<String>,
}

pub fn latest_date<'a, I>(records: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    records.into_iter().map(|r| r.posted_date).max()
}

/// Narrows `records` to the postings matching every active predicate, keeping order.
///
/// The date window is anchored on the latest posting of `records`, not on today.
pub fn apply_filters<'a>(
    records: &'a [CanonicalRecord],
    filters: &FilterState,
) -> Vec<&'a CanonicalRecord> {
    let text = filters.text.trim().to_lowercase();
    let min_date = filters
        .date_range
        .days()
        .and_then(|days| Some(latest_date(records)? - Duration::days(days)));

    records
        .iter()
        .filter(|r| min_date.map_or(true, |min| r.posted_date >= min))
        .filter(|r| text.is_empty() || searchable_text(r).contains(&text))
        .filter(|r| {
            filters.min_salary <= 0.0 || r.salary.is_some_and(|s| s >= filters.min_salary)
        })
        .filter(|r| !filters.hybrid_only || r.hybrid_policy)
        .filter(|r| !filters.visa_only || r.visa_sponsorship)
        .filter(|r| filters.countries.is_empty() || filters.countries.contains(&r.country))
        .filter(|r| filters.roles.is_empty() || filters.roles.contains(&r.role))
        .filter(|r| {
            filters.seniorities.is_empty() || filters.seniorities.contains(&r.seniority_level)
        })
        .filter(|r| filters.skills.iter().all(|s| r.technical_skills.contains(s)))
        .collect()
}

fn searchable_text(record: &CanonicalRecord) -> String {
    format!(
        "{} {}",
        record.title.as_deref().unwrap_or_default(),
        record.description.as_deref().unwrap_or_default()
    )
    .to_lowercase()
}

pub fn facets(records: &[CanonicalRecord], chip_count: usize) -> Facets {
    let countries: BTreeSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let seniorities: BTreeSet<&str> = records.iter().map(|r| r.seniority_level.as_str()).collect();
    let mut roles: Vec<Role> = records
        .iter()
        .map(|r| r.role)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .collect();
    roles.sort_by_key(|r| r.label());

    Facets {
        countries: countries.into_iter().map(str::to_string).collect(),
        roles,
        seniorities: seniorities.into_iter().map(str::to_string).collect(),
        skill_chips: skill_chips(records, chip_count),
        market_worth_chips: to_owned_list(MARKET_WORTH_SKILLS),
    }
}

/// Most frequent technical skills; ties keep first-seen order.
pub fn skill_chips(records: &[CanonicalRecord], limit: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for skill in records.iter().flat_map(|r| r.technical_skills.iter()) {
        let count = counts.entry(skill.as_str()).or_insert_with(|| {
            order.push(skill.as_str());
            0
        });
        *count += 1;
    }

    // sort_by 是穩定排序
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(limit).map(str::to_string).collect()
}

/// Role preselected in the drift chart: an analyst role, else an engineer role, else the first.
pub fn default_drift_role(roles: &[Role]) -> Option<Role> {
    let mut sorted = roles.to_vec();
    sorted.sort_by_key(|r| r.label());
    sorted
        .iter()
        .find(|r| r.label().contains("Analyst"))
        .or_else(|| sorted.iter().find(|r| r.label().contains("Engineer")))
        .or_else(|| sorted.first())
        .copied()
}
