use crate::core::aggregate::{
    drift_by_dimension, monthly_volume, role_skill_drift, tracked_drift, Dimension, DriftChart,
    DriftSpec, MonthCount, MonthWindow,
};
use crate::core::filter::{apply_filters, default_drift_role, facets, Facets};
use crate::core::geo::{country_points, CountryPoint};
use crate::core::kpi::{compute_kpis, market_worth, Kpis, MarketWorth};
use crate::core::overview::{build_overview, Overview};
use crate::domain::geo::Basemap;
use crate::domain::model::{CanonicalRecord, FilterState, Role};
use crate::domain::params::{AggregationParams, MarketWorthParams};
use serde::Serialize;

pub const NO_DATA: &str = "No data available";
pub const NOT_ENOUGH_SIGNAL: &str = "Not enough signal to show evolution.";
pub const NO_TEMPORAL_SIGNAL: &str = "No temporal signal in the current filters.";
pub const NO_ROLE_DATA: &str = "No data for this role in the current filters.";
pub const NO_ROLE_SKILLS: &str = "No tracked skills found for this role.";
pub const NO_COUNTRY_DATA: &str = "No country-level information in the current filters.";
pub const MAP_UNAVAILABLE: &str = "World map unavailable.";

/// One chart's content, or the message shown in its place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Ready(T),
    Empty { message: String },
}

impl<T> Panel<T> {
    pub fn empty(message: &str) -> Self {
        Panel::Empty {
            message: message.to_string(),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            Panel::Empty { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Panel::Ready(_) => None,
            Panel::Empty { message } => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobVolume {
    pub baseline: Vec<MonthCount>,
    pub filtered: Vec<MonthCount>,
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub total_postings: usize,
    pub filtered_postings: usize,
    /// Views below were computed over the full dataset because the filters matched nothing.
    pub using_full_dataset: bool,
    pub filters: FilterState,
    pub facets: Facets,
    pub drift_role: Option<Role>,
    pub kpis: Panel<Kpis>,
    pub job_volume: Panel<JobVolume>,
    pub role_drift: Panel<DriftChart>,
    pub technology_drift: Panel<DriftChart>,
    pub soft_skill_drift: Panel<DriftChart>,
    pub domain_drift: Panel<DriftChart>,
    pub market_worth: Panel<MarketWorth>,
    pub world_map: Panel<Vec<CountryPoint>>,
}

/// Loaded dataset plus the user's selections.
///
/// Selections change only through the setters; views are recomputed from
/// the full dataset on every [`Dashboard::snapshot`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    records: Vec<CanonicalRecord>,
    filters: FilterState,
    drift_role: Option<Role>,
    market_worth: MarketWorthParams,
    params: AggregationParams,
}

impl Dashboard {
    pub fn new(records: Vec<CanonicalRecord>, params: AggregationParams) -> Self {
        let roles = facets(&records, 0).roles;
        Self {
            drift_role: default_drift_role(&roles),
            records,
            filters: FilterState::default(),
            market_worth: MarketWorthParams::default(),
            params,
        }
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn params(&self) -> &AggregationParams {
        &self.params
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn toggle_skill_chip(&mut self, skill: &str) {
        self.filters.toggle_skill(skill);
    }

    pub fn reset_filters(&mut self) {
        self.filters = FilterState::default();
    }

    pub fn drift_role(&self) -> Option<Role> {
        self.drift_role
    }

    pub fn set_drift_role(&mut self, role: Role) {
        self.drift_role = Some(role);
    }

    pub fn market_worth_query(&self) -> &MarketWorthParams {
        &self.market_worth
    }

    pub fn set_market_worth(&mut self, query: MarketWorthParams) {
        self.market_worth = query;
    }

    pub fn toggle_market_worth_skill(&mut self, skill: &str) {
        let key = skill.trim().to_lowercase();
        if key.is_empty() {
            return;
        }
        match self.market_worth.skills.iter().position(|s| *s == key) {
            Some(i) => {
                self.market_worth.skills.remove(i);
            }
            None => self.market_worth.skills.push(key),
        }
    }

    pub fn filtered(&self) -> Vec<&CanonicalRecord> {
        apply_filters(&self.records, &self.filters)
    }

    /// The rows the views read: the filtered rows, or every row when none match.
    fn active<'a>(&'a self, filtered: &[&'a CanonicalRecord]) -> (Vec<&'a CanonicalRecord>, bool) {
        if filtered.is_empty() && self.params.fallback_to_full_dataset && !self.records.is_empty() {
            (self.records.iter().collect(), true)
        } else {
            (filtered.to_vec(), false)
        }
    }

    pub fn facets(&self) -> Facets {
        facets(&self.records, self.params.skill_chip_count)
    }

    /// The overview page reads the whole dataset and ignores the filters.
    pub fn overview(&self) -> Overview {
        let all: Vec<&CanonicalRecord> = self.records.iter().collect();
        build_overview(&all, self.params.top_n)
    }

    pub fn snapshot(&self, basemap: Option<&Basemap>) -> DashboardView {
        let filtered = self.filtered();
        let (active, using_full_dataset) = self.active(&filtered);
        let all: Vec<&CanonicalRecord> = self.records.iter().collect();

        DashboardView {
            total_postings: self.records.len(),
            filtered_postings: filtered.len(),
            using_full_dataset,
            filters: self.filters.clone(),
            facets: self.facets(),
            drift_role: self.drift_role,
            kpis: match compute_kpis(&active, &self.params.tracked_technologies) {
                Some(kpis) => Panel::Ready(kpis),
                None => Panel::empty(NO_DATA),
            },
            job_volume: self.job_volume(&all, &active),
            role_drift: self.role_drift(&active),
            technology_drift: self.drift_panel(&active, |rows, spec| {
                tracked_drift(rows, &self.params.tracked_technologies, spec)
            }),
            soft_skill_drift: self.drift_panel(&active, |rows, spec| {
                drift_by_dimension(rows, Dimension::SoftSkills, spec)
            }),
            domain_drift: self.drift_panel(&active, |rows, spec| {
                drift_by_dimension(rows, Dimension::Domains, spec)
            }),
            market_worth: if active.is_empty() {
                Panel::empty(NO_DATA)
            } else {
                Panel::Ready(market_worth(&active, &self.market_worth))
            },
            world_map: world_map(&active, basemap),
        }
    }

    fn drift_spec(&self, max_series: usize, min_count: usize) -> DriftSpec {
        DriftSpec {
            window: MonthWindow::Last(self.params.max_months),
            min_count,
            max_series,
        }
    }

    fn job_volume(&self, all: &[&CanonicalRecord], active: &[&CanonicalRecord]) -> Panel<JobVolume> {
        if all.is_empty() {
            return Panel::empty(NO_DATA);
        }
        Panel::Ready(JobVolume {
            baseline: monthly_volume(all),
            filtered: monthly_volume(active),
        })
    }

    fn drift_panel<F>(&self, active: &[&CanonicalRecord], chart: F) -> Panel<DriftChart>
    where
        F: Fn(&[&CanonicalRecord], DriftSpec) -> DriftChart,
    {
        if active.is_empty() {
            return Panel::empty(NO_DATA);
        }
        let spec = self.drift_spec(self.params.drift_max_series, self.params.drift_min_count);
        let drift = chart(active, spec);
        if drift.months.is_empty() {
            Panel::empty(NO_TEMPORAL_SIGNAL)
        } else if drift.series.is_empty() {
            Panel::empty(NOT_ENOUGH_SIGNAL)
        } else {
            Panel::Ready(drift)
        }
    }

    fn role_drift(&self, active: &[&CanonicalRecord]) -> Panel<DriftChart> {
        if active.is_empty() {
            return Panel::empty(NO_DATA);
        }
        let Some(role) = self.drift_role else {
            return Panel::empty(NO_ROLE_DATA);
        };
        if !active.iter().any(|r| r.role == role) {
            return Panel::empty(NO_ROLE_DATA);
        }
        let spec = self.drift_spec(self.params.role_drift_max_series, 0);
        let drift = role_skill_drift(active, role, &self.params.role_drift_skills, spec);
        if drift.series.is_empty() {
            Panel::empty(NO_ROLE_SKILLS)
        } else {
            Panel::Ready(drift)
        }
    }
}

fn world_map(active: &[&CanonicalRecord], basemap: Option<&Basemap>) -> Panel<Vec<CountryPoint>> {
    let Some(basemap) = basemap else {
        return Panel::empty(MAP_UNAVAILABLE);
    };
    if active.is_empty() {
        return Panel::empty(NO_DATA);
    }
    let points = country_points(active, basemap);
    if points.is_empty() {
        Panel::empty(NO_COUNTRY_DATA)
    } else {
        Panel::Ready(points)
    }
}
