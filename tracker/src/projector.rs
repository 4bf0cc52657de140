//! Equirectangular projection between geodetic and viewport pixel coordinates.

use tle_types::prelude::{wrap_longitude, GeodeticPoint, PixelPoint};

/// Drawable area [px]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> PixelPoint {
        PixelPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

pub fn project(point: &GeodeticPoint, viewport: &Viewport) -> PixelPoint {
    PixelPoint::new(
        (point.longitude_deg + 180.0) * viewport.width / 360.0,
        (90.0 - point.latitude_deg) * viewport.height / 180.0,
    )
}

pub fn unproject(pixel: &PixelPoint, viewport: &Viewport) -> GeodeticPoint {
    GeodeticPoint::new(
        90.0 - pixel.y * 180.0 / viewport.height,
        pixel.x * 360.0 / viewport.width - 180.0,
    )
}

/// Split a track into runs that each stay on one copy of the map.
///
/// Every point is folded back into (-180, 180]. Where consecutive points land on
/// opposite sides of the antimeridian, the crossing latitude is interpolated and
/// the run is closed at one map edge and the next run opened at the other.
pub fn split_at_seam(points: &[GeodeticPoint]) -> Vec<Vec<GeodeticPoint>> {
    let mut runs = Vec::new();
    let mut run: Vec<GeodeticPoint> = Vec::new();

    for p in points.iter().map(|p| p.wrapped()) {
        if let Some(prev) = run.last().copied() {
            let delta = p.longitude_deg - prev.longitude_deg;
            if delta.abs() > 180.0 {
                // Eastward crossings wrap from +180 to -180, westward the reverse
                let (exit_lon, entry_lon, to_seam, travel) = if delta < 0.0 {
                    (180.0, -180.0, 180.0 - prev.longitude_deg, delta + 360.0)
                } else {
                    (-180.0, 180.0, prev.longitude_deg + 180.0, 360.0 - delta)
                };
                let frac = if travel == 0.0 { 0.0 } else { to_seam / travel };
                let lat = prev.latitude_deg + frac * (p.latitude_deg - prev.latitude_deg);
                run.push(GeodeticPoint::new(lat, exit_lon));
                runs.push(std::mem::take(&mut run));
                run.push(GeodeticPoint::new(lat, entry_lon));
            }
        }
        run.push(p);
    }

    if !run.is_empty() {
        runs.push(run);
    }
    runs
}

/// Project a track into pixel polylines, one per seam-free run
pub fn project_track(points: &[GeodeticPoint], viewport: &Viewport) -> Vec<Vec<PixelPoint>> {
    split_at_seam(points)
        .iter()
        .map(|run| run.iter().map(|p| project(p, viewport)).collect())
        .collect()
}

/// Project a point known to be on the map, folding its longitude first
pub fn project_wrapped(point: &GeodeticPoint, viewport: &Viewport) -> PixelPoint {
    project(
        &GeodeticPoint::new(point.latitude_deg, wrap_longitude(point.longitude_deg)),
        viewport,
    )
}
