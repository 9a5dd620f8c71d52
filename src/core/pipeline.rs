use crate::adapters::http::{HttpBasemapSource, HttpJobSource};
use crate::core::dashboard::Dashboard;
use crate::core::export::{
    filtered_csv, report_json, DashboardReport, DASHBOARD_FILE, FILTERED_CSV_FILE,
};
use crate::core::geo::BasemapCache;
use crate::core::normalize::normalize_all;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::RawRecord;
use crate::domain::ports::{BasemapSource, JobSource};
use crate::utils::error::Result;
use chrono::Utc;

/// Normalized dataset ready for the dashboard, plus ingestion counts.
#[derive(Debug, Clone)]
pub struct PreparedDashboard {
    pub dashboard: Dashboard,
    pub fetched: usize,
    pub dropped_undated: usize,
}

/// fetch → normalize → compute views → write `dashboard.json` and `filtered_jobs.csv`.
pub struct ObservatoryPipeline<S, C, J = HttpJobSource, B = HttpBasemapSource>
where
    S: Storage,
    C: ConfigProvider,
    J: JobSource,
    B: BasemapSource,
{
    storage: S,
    config: C,
    jobs: J,
    basemap: BasemapCache<B>,
}

impl<S: Storage, C: ConfigProvider> ObservatoryPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let jobs = HttpJobSource::from_config(&config)?;
        let basemap = HttpBasemapSource::from_config(&config)?;
        Ok(Self::with_sources(storage, config, jobs, basemap))
    }
}

impl<S, C, J, B> ObservatoryPipeline<S, C, J, B>
where
    S: Storage,
    C: ConfigProvider,
    J: JobSource,
    B: BasemapSource,
{
    pub fn with_sources(storage: S, config: C, jobs: J, basemap: B) -> Self {
        Self {
            storage,
            config,
            jobs,
            basemap: BasemapCache::new(basemap),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn basemap(&self) -> &BasemapCache<B> {
        &self.basemap
    }

    /// Dashboard with the configured selections applied.
    pub fn build_dashboard(&self, data: &[RawRecord]) -> PreparedDashboard {
        let normalized = normalize_all(data, self.config.dialect());
        let mut dashboard = Dashboard::new(normalized.records, self.config.aggregation().clone());
        dashboard.set_filters(self.config.filters().clone());
        dashboard.set_market_worth(self.config.market_worth().clone());
        if let Some(role) = self.config.drift_role() {
            dashboard.set_drift_role(role);
        }

        PreparedDashboard {
            dashboard,
            fetched: data.len(),
            dropped_undated: normalized.dropped_undated,
        }
    }
}

#[async_trait::async_trait]
impl<S, C, J, B> Pipeline for ObservatoryPipeline<S, C, J, B>
where
    S: Storage,
    C: ConfigProvider,
    J: JobSource,
    B: BasemapSource,
{
    type Loaded = PreparedDashboard;

    async fn extract(&self) -> Result<Vec<RawRecord>> {
        self.jobs.fetch_jobs().await
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<PreparedDashboard> {
        let prepared = self.build_dashboard(&data);
        tracing::debug!(
            "Normalized {} of {} postings ({} without a date)",
            prepared.dashboard.records().len(),
            prepared.fetched,
            prepared.dropped_undated
        );
        Ok(prepared)
    }

    async fn load(&self, prepared: PreparedDashboard) -> Result<String> {
        let basemap = self.basemap.get().await;
        let dashboard = &prepared.dashboard;
        let view = dashboard.snapshot(basemap.as_deref());

        tracing::debug!(
            "Writing {} of {} postings to {}",
            view.filtered_postings,
            view.total_postings,
            FILTERED_CSV_FILE
        );
        let csv = filtered_csv(&dashboard.filtered())?;
        self.storage.write_file(FILTERED_CSV_FILE, &csv).await?;

        let report = DashboardReport {
            generated_at: Utc::now(),
            source_endpoint: self.config.api_endpoint().to_string(),
            fetched_postings: prepared.fetched,
            dropped_undated: prepared.dropped_undated,
            overview: dashboard.overview(),
            dashboard: view,
        };
        self.storage
            .write_file(DASHBOARD_FILE, &report_json(&report)?)
            .await?;

        Ok(format!("{}/{}", self.config.output_path(), DASHBOARD_FILE))
    }
}
