//! GPX file parser for route import.

use super::{ImportError, ImportedRoute, RouteSample};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two GPS points in meters.
fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Parse GPX content into an ordered route.
///
/// Points come from tracks first, then routes, then bare waypoints.
/// Distances accumulate along the great-circle path; points without
/// elevation inherit the previous sample's value.
pub fn parse_gpx(content: &[u8]) -> Result<ImportedRoute, ImportError> {
    let gpx_data: gpx::Gpx =
        gpx::read(content).map_err(|e| ImportError::ParseError(format!("GPX parse error: {}", e)))?;

    let mut points: Vec<(f64, f64, Option<f64>)> = Vec::new();

    for track in &gpx_data.tracks {
        for segment in &track.segments {
            for point in &segment.points {
                points.push((point.point().y(), point.point().x(), point.elevation));
            }
        }
    }

    if points.is_empty() {
        for route in &gpx_data.routes {
            for point in &route.points {
                points.push((point.point().y(), point.point().x(), point.elevation));
            }
        }
    }

    if points.is_empty() {
        for point in &gpx_data.waypoints {
            points.push((point.point().y(), point.point().x(), point.elevation));
        }
    }

    if points.is_empty() {
        return Err(ImportError::ParseError(
            "No GPS points found in GPX file".to_string(),
        ));
    }

    let mut samples = Vec::with_capacity(points.len());
    let mut distance = 0.0;
    let mut last_elevation = 0.0;

    for (i, &(lat, lon, elevation)) in points.iter().enumerate() {
        if i > 0 {
            let (prev_lat, prev_lon, _) = points[i - 1];
            distance += haversine_m(prev_lat, prev_lon, lat, lon);
        }
        if let Some(e) = elevation {
            last_elevation = e;
        }
        samples.push(RouteSample {
            distance_m: distance,
            elevation_m: last_elevation,
            latitude: lat,
            longitude: lon,
        });
    }

    let name = route_name(&gpx_data).unwrap_or_else(|| "Imported route".to_string());

    tracing::debug!(
        "parsed GPX '{}': {} points, {:.1} km",
        name,
        samples.len(),
        distance / 1000.0
    );

    Ok(ImportedRoute::new(name, samples))
}

/// Route name: track name, then route name, then metadata name.
fn route_name(gpx_data: &gpx::Gpx) -> Option<String> {
    if let Some(track) = gpx_data.tracks.first() {
        if let Some(name) = &track.name {
            return Some(name.clone());
        }
    }
    if let Some(route) = gpx_data.routes.first() {
        if let Some(name) = &route.name {
            return Some(name.clone());
        }
    }
    gpx_data.metadata.as_ref().and_then(|m| m.name.clone())
}
