#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Region boundary and geofencing.
//!
//! Loads the region's administrative polygon from a `GeoJSON` file, keeps
//! the largest component of a multi-polygon, expands it by a fixed buffer,
//! and answers point-in-polygon queries for fire detections.
//!
//! Geofencing is fail-open: when no boundary could be loaded, every point
//! is accepted. [`load_boundary`] logs a warning when that happens since it
//! silently disables filtering.

use std::path::Path;

use geo::{Area, BoundingRect, Buffer, Contains, MultiPolygon, Point, Polygon, Rect};
use geojson::GeoJson;
use thiserror::Error;

/// Errors from boundary loading.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// File read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Text is not valid `GeoJSON`, or its geometry could not be converted.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document has no usable geometry.
    #[error("Invalid boundary: {message}")]
    Invalid {
        /// Description of what is missing or unsupported.
        message: String,
    },
}

/// A buffered region boundary. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Boundary {
    polygon: MultiPolygon<f64>,
    envelope: Option<Rect<f64>>,
}

impl Boundary {
    /// Builds a boundary from a single polygon expanded by `buffer`
    /// degrees.
    #[must_use]
    pub fn from_polygon(polygon: &Polygon<f64>, buffer: f64) -> Self {
        let polygon = if buffer > 0.0 {
            polygon.buffer(buffer)
        } else {
            MultiPolygon(vec![polygon.clone()])
        };
        let envelope = polygon.bounding_rect();
        Self { polygon, envelope }
    }

    /// Parses a `GeoJSON` boundary description.
    ///
    /// Accepts a `FeatureCollection` (first feature's geometry is used), a
    /// single `Feature`, or a bare geometry. The geometry must be a
    /// `Polygon` or `MultiPolygon`; for the latter only the component with
    /// the greatest area is kept (first one wins on ties).
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError`] if the text is not `GeoJSON` or carries no
    /// polygonal geometry.
    pub fn from_geojson_str(geojson_str: &str, buffer: f64) -> Result<Self, BoundaryError> {
        let geojson: GeoJson = geojson_str.parse()?;

        let geometry = match geojson {
            GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .next()
                .ok_or_else(|| invalid("feature collection is empty"))?
                .geometry,
            GeoJson::Feature(feature) => feature.geometry,
            GeoJson::Geometry(geometry) => Some(geometry),
        }
        .ok_or_else(|| invalid("feature has no geometry"))?;

        let polygon = match geo::Geometry::<f64>::try_from(geometry)? {
            geo::Geometry::Polygon(p) => p,
            geo::Geometry::MultiPolygon(mp) => {
                largest_polygon(mp).ok_or_else(|| invalid("multi-polygon has no components"))?
            }
            other => {
                return Err(invalid(&format!(
                    "unsupported geometry type {}",
                    geometry_kind(&other)
                )));
            }
        };

        if polygon.exterior().0.len() < 4 {
            return Err(invalid("polygon exterior ring has fewer than 4 points"));
        }

        Ok(Self::from_polygon(&polygon, buffer))
    }

    /// Whether the point lies inside the buffered boundary.
    ///
    /// Takes the conventional `(lat, lon)` pair; the geometry itself is in
    /// `(x = lon, y = lat)` order. Non-finite coordinates are never
    /// contained.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if !lat.is_finite() || !lon.is_finite() {
            return false;
        }

        if let Some(env) = self.envelope {
            let (min, max) = (env.min(), env.max());
            if lon < min.x || lon > max.x || lat < min.y || lat > max.y {
                return false;
            }
        }

        self.polygon.contains(&Point::new(lon, lat))
    }

    /// Bounding rectangle of the buffered boundary.
    #[must_use]
    pub const fn bounds(&self) -> Option<Rect<f64>> {
        self.envelope
    }

    /// Planar area in square degrees.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }
}

/// Loads the region boundary from a `GeoJSON` file.
///
/// Returns `None` on any failure (missing file, malformed geometry). The
/// caller must treat `None` as "accept all points".
#[must_use]
pub fn load_boundary(path: &Path, buffer: f64) -> Option<Boundary> {
    let result = std::fs::read_to_string(path)
        .map_err(BoundaryError::from)
        .and_then(|text| Boundary::from_geojson_str(&text, buffer));

    match result {
        Ok(boundary) => {
            if let Some(rect) = boundary.bounds() {
                log::info!(
                    "Boundary loaded from {}: bounds (lon_min={:.4}, lat_min={:.4}, lon_max={:.4}, lat_max={:.4}), area {:.2} sq degrees",
                    path.display(),
                    rect.min().x,
                    rect.min().y,
                    rect.max().x,
                    rect.max().y,
                    boundary.area(),
                );
            }
            Some(boundary)
        }
        Err(e) => {
            log::warn!(
                "Failed to load boundary from {}: {e}; geofencing is disabled and all points will be accepted",
                path.display()
            );
            None
        }
    }
}

/// Wraps a raw geometry (as returned by a geocoder search) into a
/// one-feature collection carrying `name`, ready to be saved as a boundary
/// file.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if `geometry` is not a valid
/// `GeoJSON` geometry object.
pub fn boundary_document(
    geometry: geojson::JsonValue,
    name: &str,
) -> Result<GeoJson, BoundaryError> {
    let geometry = geojson::Geometry::from_json_value(geometry)?;

    let mut properties = geojson::JsonObject::new();
    properties.insert("name".to_string(), geojson::JsonValue::from(name));

    Ok(GeoJson::FeatureCollection(geojson::FeatureCollection {
        bbox: None,
        features: vec![geojson::Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }],
        foreign_members: None,
    }))
}

/// Geofence test with fail-open semantics: no boundary accepts everything.
#[must_use]
pub fn contains(lat: f64, lon: f64, boundary: Option<&Boundary>) -> bool {
    boundary.is_none_or(|b| b.contains(lat, lon))
}

fn largest_polygon(mp: MultiPolygon<f64>) -> Option<Polygon<f64>> {
    let mut best: Option<(f64, Polygon<f64>)> = None;

    for polygon in mp {
        let area = polygon.unsigned_area();
        match &best {
            Some((best_area, _)) if area <= *best_area => {}
            _ => best = Some((area, polygon)),
        }
    }

    best.map(|(_, p)| p)
}

const fn geometry_kind(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        _ => "non-polygonal geometry",
    }
}

fn invalid(message: &str) -> BoundaryError {
    BoundaryError::Invalid {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUFFER: f64 = 0.02;

    /// Closed rectangular ring in `GeoJSON` (lon, lat) order.
    fn rect_ring(west: f64, south: f64, east: f64, north: f64) -> serde_json::Value {
        serde_json::json!([[
            [west, south],
            [east, south],
            [east, north],
            [west, north],
            [west, south]
        ]])
    }

    fn feature_collection(geometry: &serde_json::Value) -> String {
        serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"name": "Test (OSM)"},
                "geometry": geometry
            }]
        })
        .to_string()
    }

    fn polygon_boundary() -> Boundary {
        let geometry = serde_json::json!({
            "type": "Polygon",
            "coordinates": rect_ring(78.0, 29.0, 80.0, 30.0)
        });
        Boundary::from_geojson_str(&feature_collection(&geometry), BUFFER).unwrap()
    }

    #[test]
    fn contains_interior_point() {
        assert!(polygon_boundary().contains(29.5, 79.0));
    }

    #[test]
    fn buffer_absorbs_points_just_outside() {
        let boundary = polygon_boundary();
        assert!(boundary.contains(29.5, 80.01));
        assert!(boundary.contains(30.01, 79.0));
        assert!(!boundary.contains(29.5, 80.05));
    }

    #[test]
    fn zero_buffer_keeps_strict_polygon() {
        let geometry = serde_json::json!({
            "type": "Polygon",
            "coordinates": rect_ring(78.0, 29.0, 80.0, 30.0)
        });
        let boundary = Boundary::from_geojson_str(&feature_collection(&geometry), 0.0).unwrap();
        assert!(boundary.contains(29.5, 79.0));
        assert!(!boundary.contains(29.5, 80.01));
    }

    #[test]
    fn point_axes_are_not_swapped() {
        let boundary = polygon_boundary();
        // (lat=29.5, lon=79.0) is inside; the swapped pair is nowhere near.
        assert!(boundary.contains(29.5, 79.0));
        assert!(!boundary.contains(79.0, 29.5));
    }

    #[test]
    fn non_finite_points_are_excluded() {
        let boundary = polygon_boundary();
        assert!(!boundary.contains(f64::NAN, 79.0));
        assert!(!boundary.contains(29.5, f64::INFINITY));
    }

    #[test]
    fn multipolygon_keeps_largest_component() {
        let geometry = serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": [
                rect_ring(70.0, 20.0, 70.5, 20.5),
                rect_ring(78.0, 29.0, 80.0, 30.0),
            ]
        });
        let boundary = Boundary::from_geojson_str(&feature_collection(&geometry), BUFFER).unwrap();
        assert!(boundary.contains(29.5, 79.0));
        assert!(!boundary.contains(20.25, 70.25));
    }

    #[test]
    fn multipolygon_tie_keeps_first_component() {
        let geometry = serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": [
                rect_ring(70.0, 20.0, 71.0, 21.0),
                rect_ring(78.0, 29.0, 79.0, 30.0),
            ]
        });
        let boundary = Boundary::from_geojson_str(&feature_collection(&geometry), BUFFER).unwrap();
        assert!(boundary.contains(20.5, 70.5));
        assert!(!boundary.contains(29.5, 78.5));
    }

    #[test]
    fn accepts_bare_geometry() {
        let geometry = serde_json::json!({
            "type": "Polygon",
            "coordinates": rect_ring(78.0, 29.0, 80.0, 30.0)
        });
        let boundary = Boundary::from_geojson_str(&geometry.to_string(), BUFFER).unwrap();
        assert!(boundary.contains(29.5, 79.0));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let geometry = serde_json::json!({"type": "Point", "coordinates": [79.0, 29.5]});
        assert!(matches!(
            Boundary::from_geojson_str(&feature_collection(&geometry), BUFFER),
            Err(BoundaryError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_empty_feature_collection() {
        let text = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(Boundary::from_geojson_str(text, BUFFER).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(Boundary::from_geojson_str("not json", BUFFER).is_err());
    }

    #[test]
    fn missing_file_loads_as_none() {
        let path = std::env::temp_dir().join("fire_monitor_spatial_missing.geojson");
        let _ = std::fs::remove_file(&path);
        assert!(load_boundary(&path, BUFFER).is_none());
    }

    #[test]
    fn loads_boundary_file() {
        let path = std::env::temp_dir().join("fire_monitor_spatial_boundary.geojson");
        let geometry = serde_json::json!({
            "type": "Polygon",
            "coordinates": rect_ring(78.0, 29.0, 80.0, 30.0)
        });
        std::fs::write(&path, feature_collection(&geometry)).unwrap();

        let boundary = load_boundary(&path, BUFFER).unwrap();
        assert!(boundary.contains(29.5, 79.0));
        assert!(boundary.area() > 2.0);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn no_boundary_accepts_everything() {
        for (lat, lon) in [(0.0, 0.0), (29.5, 79.0), (999.0, -999.0), (-91.0, 181.0)] {
            assert!(contains(lat, lon, None), "({lat}, {lon})");
        }
    }

    #[test]
    fn with_boundary_delegates_to_polygon() {
        let boundary = polygon_boundary();
        assert!(contains(29.5, 79.0, Some(&boundary)));
        assert!(!contains(0.0, 0.0, Some(&boundary)));
    }

    #[test]
    fn boundary_document_is_loadable() {
        let geometry = serde_json::json!({
            "type": "Polygon",
            "coordinates": rect_ring(78.0, 29.0, 80.0, 30.0)
        });
        let doc = boundary_document(geometry, "Uttarakhand (OSM)").unwrap();

        let value: serde_json::Value = serde_json::from_str(&doc.to_string()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["properties"]["name"], "Uttarakhand (OSM)");

        let boundary = Boundary::from_geojson_str(&doc.to_string(), 0.0).unwrap();
        assert!(boundary.contains(29.5, 79.0));
    }

    #[test]
    fn boundary_document_rejects_non_geometry() {
        let result = boundary_document(serde_json::json!({"type": "Nope"}), "x");
        assert!(matches!(result, Err(BoundaryError::GeoJson(_))));
    }
}
