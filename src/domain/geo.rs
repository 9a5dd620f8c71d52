use crate::utils::error::{ObservatoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Country polygons of the world basemap, decoded from a GeoJSON FeatureCollection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Basemap {
    pub countries: Vec<CountryShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShape {
    pub name: String,
    /// Outer rings as (lon, lat) pairs, one per polygon.
    pub rings: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl Basemap {
    pub fn from_geojson(value: Value) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_value(value)?;
        if collection.features.is_empty() {
            return Err(ObservatoryError::BasemapError {
                message: "feature collection has no features".to_string(),
            });
        }

        let countries = collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let properties = feature.properties.unwrap_or_default();
                let name = properties
                    .get("name")
                    .or_else(|| properties.get("NAME"))
                    .or_else(|| properties.get("ADMIN"))
                    .and_then(Value::as_str)?
                    .trim()
                    .to_string();
                let rings = feature.geometry.map(outer_rings).unwrap_or_default();
                if name.is_empty() || rings.is_empty() {
                    return None;
                }
                Some(CountryShape { name, rings })
            })
            .collect();

        Ok(Self { countries })
    }
}

fn outer_rings(geometry: Geometry) -> Vec<Vec<(f64, f64)>> {
    match geometry.kind.as_str() {
        "Polygon" => first_ring(&geometry.coordinates).into_iter().collect(),
        "MultiPolygon" => geometry
            .coordinates
            .as_array()
            .map(|polys| polys.iter().filter_map(first_ring).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn first_ring(polygon: &Value) -> Option<Vec<(f64, f64)>> {
    let ring = polygon.as_array()?.first()?.as_array()?;
    let points: Vec<(f64, f64)> = ring
        .iter()
        .filter_map(|p| {
            let pair = p.as_array()?;
            Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
        })
        .collect();
    if points.len() < 3 {
        None
    } else {
        Some(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_polygon_and_multipolygon() {
        let geo = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"name": "France"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Islands"},
                    "geometry": {"type": "MultiPolygon", "coordinates": [
                        [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                        [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
                    ]}
                },
                {
                    "type": "Feature",
                    "properties": {"name": "Nowhere"},
                    "geometry": null
                }
            ]
        });

        let basemap = Basemap::from_geojson(geo).unwrap();
        assert_eq!(basemap.countries.len(), 2);
        assert_eq!(basemap.countries[0].name, "France");
        assert_eq!(basemap.countries[1].rings.len(), 2);
    }

    #[test]
    fn test_empty_collection_is_an_error() {
        let err = Basemap::from_geojson(json!({"type": "FeatureCollection", "features": []}));
        assert!(matches!(err, Err(ObservatoryError::BasemapError { .. })));
    }
}
