use crate::domain::geo::Basemap;
use crate::domain::model::RawRecord;
use crate::domain::ports::{BasemapSource, ConfigProvider, JobSource};
use crate::utils::error::{ObservatoryError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub fn build_client(timeout_seconds: u64) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?)
}

async fn get_json(client: &Client, url: &str) -> Result<Value> {
    tracing::debug!("Making API request to: {}", url);
    let response = client.get(url).send().await?;
    tracing::debug!("API response status: {}", response.status());

    if !response.status().is_success() {
        return Err(ObservatoryError::FetchStatusError {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }
    Ok(response.json().await?)
}

/// Reads the JSON array of postings from the data endpoint.
#[derive(Debug, Clone)]
pub struct HttpJobSource {
    client: Client,
    endpoint: String,
}

impl HttpJobSource {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(
            build_client(config.timeout_seconds())?,
            config.api_endpoint(),
        ))
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn fetch_jobs(&self) -> Result<Vec<RawRecord>> {
        let items = match get_json(&self.client, &self.endpoint).await? {
            Value::Array(items) => items,
            other => {
                return Err(ObservatoryError::PayloadError {
                    message: format!("expected a JSON array of postings, got {}", kind(&other)),
                })
            }
        };

        let total = items.len();
        let records: Vec<RawRecord> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(obj) => Some(RawRecord::from(obj)),
                _ => None,
            })
            .collect();
        if records.len() < total {
            tracing::warn!(
                "⚠️ Skipped {} array entries that are not JSON objects",
                total - records.len()
            );
        }
        Ok(records)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Downloads the world GeoJSON used by the map view.
#[derive(Debug, Clone)]
pub struct HttpBasemapSource {
    client: Client,
    endpoint: String,
}

impl HttpBasemapSource {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self::new(
            build_client(config.timeout_seconds())?,
            config.basemap_endpoint(),
        ))
    }
}

#[async_trait]
impl BasemapSource for HttpBasemapSource {
    async fn fetch_basemap(&self) -> Result<Basemap> {
        let value = get_json(&self.client, &self.endpoint)
            .await
            .map_err(|e| ObservatoryError::BasemapError {
                message: format!("{} ({})", e, self.endpoint),
            })?;
        Basemap::from_geojson(value)
    }
}
