use crate::core::filter::latest_date;
use crate::core::stats::{median, uniform_histogram, HistogramBin};
use crate::domain::model::{CanonicalRecord, Role};
use crate::domain::params::MarketWorthParams;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

pub const WINDOW_DAYS: i64 = 30;
/// A technology needs this many recent postings before its growth counts.
pub const HOTTEST_TECH_MIN_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub anchor_date: NaiveDate,
    pub jobs_last_30: usize,
    pub jobs_previous_30: usize,
    pub delta_percent: f64,
    pub delta_label: String,
    pub hottest_role: Option<Role>,
    pub hottest_technology: Option<String>,
}

/// The last 30 days and the 30 days before, both counted back from the latest posting.
pub struct Windows<'a> {
    pub anchor: NaiveDate,
    pub last: Vec<&'a CanonicalRecord>,
    pub previous: Vec<&'a CanonicalRecord>,
}

pub fn split_windows<'a>(records: &[&'a CanonicalRecord]) -> Option<Windows<'a>> {
    let anchor = latest_date(records.iter().copied())?;
    let mut last = Vec::new();
    let mut previous = Vec::new();
    for &r in records {
        let age = (anchor - r.posted_date).num_days();
        if age <= WINDOW_DAYS {
            last.push(r);
        } else if age <= 2 * WINDOW_DAYS {
            previous.push(r);
        }
    }
    Some(Windows {
        anchor,
        last,
        previous,
    })
}

/// Percentage change; an empty previous window counts as 1.
pub fn delta_percent(last: usize, previous: usize) -> f64 {
    let denominator = previous.max(1) as f64;
    (last as f64 - denominator) / denominator * 100.0
}

pub fn format_delta(delta: f64) -> String {
    let rounded = (delta + 0.5).floor() as i64;
    let sign = if rounded > 0 { "+" } else { "" };
    format!("{}{}% vs prev.", sign, rounded)
}

/// Most frequent role; the first one seen wins a tie.
pub fn hottest_role(records: &[&CanonicalRecord]) -> Option<Role> {
    let mut order: Vec<Role> = Vec::new();
    let mut counts: HashMap<Role, usize> = HashMap::new();
    for r in records {
        *counts.entry(r.role).or_insert_with(|| {
            order.push(r.role);
            0
        }) += 1;
    }

    let mut best: Option<(Role, usize)> = None;
    for role in order {
        let count = counts[&role];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((role, count));
        }
    }
    best.map(|(role, _)| role)
}

/// Tracked technology with the highest growth between the two windows.
/// Ties go to the technology mentioned first in `last`.
pub fn hottest_technology(
    last: &[&CanonicalRecord],
    previous: &[&CanonicalRecord],
    tracked: &[String],
) -> Option<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut recent: HashMap<&str, usize> = HashMap::new();
    for r in last {
        for tech in tracked.iter().filter(|t| r.mentions(t)) {
            *recent.entry(tech.as_str()).or_insert_with(|| {
                order.push(tech.as_str());
                0
            }) += 1;
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for tech in order {
        let count = recent[tech];
        if count < HOTTEST_TECH_MIN_COUNT {
            continue;
        }
        let before = previous.iter().filter(|r| r.mentions(tech)).count().max(1) as f64;
        let growth = (count as f64 - before) / before;
        if best.map_or(true, |(_, g)| growth > g) {
            best = Some((tech, growth));
        }
    }
    best.map(|(tech, _)| tech.to_string())
}

pub fn compute_kpis(records: &[&CanonicalRecord], tracked: &[String]) -> Option<Kpis> {
    let windows = split_windows(records)?;
    let delta = delta_percent(windows.last.len(), windows.previous.len());

    Some(Kpis {
        anchor_date: windows.anchor,
        jobs_last_30: windows.last.len(),
        jobs_previous_30: windows.previous.len(),
        delta_percent: delta,
        delta_label: format_delta(delta),
        hottest_role: hottest_role(&windows.last),
        hottest_technology: hottest_technology(&windows.last, &windows.previous, tracked),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketWorthEstimate {
    pub matching_offers: usize,
    pub total_offers: usize,
    pub percent_of_filtered: f64,
    pub median_salary: Option<f64>,
    pub known_salaries: usize,
    pub histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarketWorth {
    NoSkillsSelected,
    NoMatches { total_offers: usize },
    Estimate(MarketWorthEstimate),
}

/// Fraction of selected skills found in the posting, times the experience affinity.
pub fn match_score(record: &CanonicalRecord, skills: &[String], params: &MarketWorthParams) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }
    let matched = skills.iter().filter(|s| record.mentions(s)).count();
    let skill_score = matched as f64 / skills.len() as f64;
    let affinity = match record.experience_years {
        None => 1.0,
        Some(years) if params.experience.contains(years) => params.affinity_match,
        Some(_) => params.affinity_mismatch,
    };
    skill_score * affinity
}

pub fn market_worth(records: &[&CanonicalRecord], params: &MarketWorthParams) -> MarketWorth {
    let mut skills: Vec<String> = Vec::new();
    for s in &params.skills {
        let s = s.trim().to_lowercase();
        if !s.is_empty() && !skills.contains(&s) {
            skills.push(s);
        }
    }
    if skills.is_empty() {
        return MarketWorth::NoSkillsSelected;
    }

    let matches: Vec<&CanonicalRecord> = records
        .iter()
        .copied()
        .filter(|r| match_score(r, &skills, params) > params.match_threshold)
        .collect();
    if matches.is_empty() {
        return MarketWorth::NoMatches {
            total_offers: records.len(),
        };
    }

    let salaries: Vec<f64> = matches.iter().filter_map(|r| r.salary).collect();
    let histogram = if salaries.len() >= params.histogram_min_salaries {
        uniform_histogram(&salaries, params.histogram_bins)
    } else {
        Vec::new()
    };

    MarketWorth::Estimate(MarketWorthEstimate {
        matching_offers: matches.len(),
        total_offers: records.len(),
        percent_of_filtered: matches.len() as f64 / records.len() as f64 * 100.0,
        median_salary: median(&salaries),
        known_salaries: salaries.len(),
        histogram,
    })
}
