use httpmock::prelude::*;
use job_observatory::config::TomlConfig;
use job_observatory::{LocalStorage, ObservatoryEngine, ObservatoryPipeline};
use serde_json::{json, Value};
use tempfile::TempDir;

fn world_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "France"},
                "geometry": {"type": "Polygon", "coordinates": [[[0.0, 42.0], [8.0, 42.0], [8.0, 50.0], [0.0, 50.0], [0.0, 42.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Germany"},
                "geometry": {"type": "Polygon", "coordinates": [[[6.0, 47.0], [14.0, 47.0], [14.0, 55.0], [6.0, 55.0], [6.0, 47.0]]]}
            }
        ]
    })
}

fn postings() -> Value {
    json!([
        {
            "date_posted": "2024-03-15", "title": "Senior Data Analyst", "company": "Acme",
            "technical_skills": "SQL;Python", "hybrid_policy": "Remote", "salary_value": "95000",
            "country": "France", "soft_skills": ["communication"]
        },
        {
            "date_posted": "2024-03-02T09:30:00Z", "job_title": "Data Engineer", "company": "Globex",
            "technical_skills": ["Spark", "Python"], "tools_used": "Airflow|dbt",
            "visa_sponsorship": "yes", "country": "Germany", "salary_value": 0
        },
        {
            "date_posted": "2024-02-10", "title": "BI Developer", "company": "Acme",
            "technical_skills": "Power BI, SQL", "country": "France", "experience_years": "3"
        },
        {"date_posted": "", "title": "Data Scientist"},
        {"title": "ML Engineer"}
    ])
}

fn config_for(server: &MockServer, output: &TempDir) -> TomlConfig {
    let mut config = TomlConfig::default();
    config.source.endpoint = server.url("/api/data");
    config.source.basemap_endpoint = server.url("/world.geojson");
    config.source.timeout_seconds = 5;
    config.load.output_path = output.path().to_string_lossy().to_string();
    config
}

fn read_report(dir: &TempDir) -> Value {
    let bytes = std::fs::read(dir.path().join("dashboard.json")).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_end_to_end_dashboard_refresh() {
    let server = MockServer::start();
    let data_mock = server.mock(|when, then| {
        when.method(GET).path("/api/data");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(postings());
    });
    let map_mock = server.mock(|when, then| {
        when.method(GET).path("/world.geojson");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(world_geojson());
    });

    let output = TempDir::new().unwrap();
    let config = config_for(&server, &output);
    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = ObservatoryPipeline::new(storage, config).unwrap();
    let engine = ObservatoryEngine::new(pipeline);

    let output_path = engine.run().await.unwrap();
    assert!(output_path.ends_with("dashboard.json"));
    data_mock.assert();
    map_mock.assert_hits(1);

    let report = read_report(&output);
    assert_eq!(report["fetched_postings"], 5);
    assert_eq!(report["dropped_undated"], 2);

    let dashboard = &report["dashboard"];
    assert_eq!(dashboard["total_postings"], 3);
    assert_eq!(dashboard["filtered_postings"], 3);
    assert_eq!(dashboard["drift_role"], "Data Analyst");
    assert_eq!(
        dashboard["facets"]["roles"],
        json!(["BI / Analytics", "Data Analyst", "Data Engineer"])
    );

    let kpis = &dashboard["kpis"]["data"];
    assert_eq!(kpis["jobs_last_30"], 2);
    assert_eq!(kpis["jobs_previous_30"], 1);
    assert_eq!(kpis["delta_label"], "+100% vs prev.");

    let points = dashboard["world_map"]["data"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["name"], "France");
    assert_eq!(points[0]["count"], 2);
    assert_eq!(points[0]["radius"], 22.0);

    assert_eq!(report["overview"]["kpis"]["distinct_companies"], 2);

    let csv = std::fs::read_to_string(output.path().join("filtered_jobs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("Senior Data Analyst"));
}

#[tokio::test]
async fn test_filters_from_config_narrow_the_export() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/data");
        then.status(200).json_body(postings());
    });
    server.mock(|when, then| {
        when.method(GET).path("/world.geojson");
        then.status(200).json_body(world_geojson());
    });

    let output = TempDir::new().unwrap();
    let mut config = config_for(&server, &output);
    config.filters.toggle_skill("sql");
    config.filters.countries = vec!["France".to_string()];
    config.market_worth.skills = vec!["sql".to_string()];

    let storage = LocalStorage::new(config.load.output_path.clone());
    let engine = ObservatoryEngine::new(ObservatoryPipeline::new(storage, config).unwrap());
    engine.run().await.unwrap();

    let report = read_report(&output);
    assert_eq!(report["dashboard"]["filtered_postings"], 2);
    assert_eq!(report["dashboard"]["using_full_dataset"], false);

    let worth = &report["dashboard"]["market_worth"]["data"];
    assert_eq!(worth["status"], "estimate");
    assert_eq!(worth["matching_offers"], 2);
    assert_eq!(worth["median_salary"], 95000.0);

    let csv = std::fs::read_to_string(output.path().join("filtered_jobs.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_failed_fetch_leaves_empty_dashboard() {
    let server = MockServer::start();
    let data_mock = server.mock(|when, then| {
        when.method(GET).path("/api/data");
        then.status(500).json_body(json!({"error": "db down"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/world.geojson");
        then.status(200).json_body(world_geojson());
    });

    let output = TempDir::new().unwrap();
    let config = config_for(&server, &output);
    let storage = LocalStorage::new(config.load.output_path.clone());
    let engine = ObservatoryEngine::new(ObservatoryPipeline::new(storage, config).unwrap());

    assert!(engine.run().await.is_ok());
    data_mock.assert_hits(1);

    let report = read_report(&output);
    let dashboard = &report["dashboard"];
    assert_eq!(dashboard["total_postings"], 0);
    assert_eq!(dashboard["kpis"]["status"], "empty");
    assert_eq!(dashboard["kpis"]["data"]["message"], "No data available");
    assert_eq!(dashboard["world_map"]["status"], "empty");
}

#[tokio::test]
async fn test_basemap_failure_keeps_other_views() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/data");
        then.status(200).json_body(postings());
    });
    let map_mock = server.mock(|when, then| {
        when.method(GET).path("/world.geojson");
        then.status(503);
    });

    let output = TempDir::new().unwrap();
    let config = config_for(&server, &output);
    let storage = LocalStorage::new(config.load.output_path.clone());
    let engine = ObservatoryEngine::new(ObservatoryPipeline::new(storage, config).unwrap());
    engine.run().await.unwrap();
    map_mock.assert_hits(1);

    let report = read_report(&output);
    let dashboard = &report["dashboard"];
    assert_eq!(dashboard["world_map"]["data"]["message"], "World map unavailable.");
    assert_eq!(dashboard["kpis"]["status"], "ready");
    assert_eq!(dashboard["job_volume"]["status"], "ready");
}
