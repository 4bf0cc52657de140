//! Ground track sampling over a window around the simulated now.

use tle_types::prelude::GeodeticPoint;
use tracing::debug;

use crate::{
    elements::ElementSet,
    frame,
    propagator::{self, PropagationError},
    units::{Time, Timestamp},
};

/// Upper bound on the number of samples in a single track
pub const MAX_TRACK_SAMPLES: i64 = 20_000;

/// Track window relative to the simulated now, half-open `[start, end)`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TrackWindow {
    pub start: Time,
    pub end: Time,
    pub step: Time,
}

impl TrackWindow {
    /// Sample indices `k` such that `start <= k * step < end` (rounded up to whole steps)
    pub fn sample_indices(&self) -> std::ops::Range<i64> {
        if !self.step.is_positive() || self.end <= self.start {
            return 0..0;
        }
        let step = self.step.as_nanos() as f64;
        let first = (self.start.as_nanos() as f64 / step).ceil() as i64;
        let last = (self.end.as_nanos() as f64 / step).ceil() as i64;
        first..last.min(first.saturating_add(MAX_TRACK_SAMPLES))
    }
}

/// Makes consecutive longitudes continuous by shifting each one by whole turns
/// so it never differs from the previous by more than 180°.
#[derive(Clone, Debug, Default)]
pub struct LongitudeUnwrapper {
    prev: Option<f64>,
}

impl LongitudeUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-finite longitudes pass through and leave the reference untouched
    pub fn unwrap(&mut self, longitude_deg: f64) -> f64 {
        if !longitude_deg.is_finite() {
            return longitude_deg;
        }
        let mut lon = longitude_deg;
        if let Some(prev) = self.prev {
            while lon - prev > 180.0 {
                lon -= 360.0;
            }
            while lon - prev < -180.0 {
                lon += 360.0;
            }
        }
        self.prev = Some(lon);
        lon
    }

    /// Forget the reference, the next longitude is taken as-is
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

pub fn unwrap_longitudes<I: IntoIterator<Item = f64>>(longitudes: I) -> Vec<f64> {
    let mut unwrapper = LongitudeUnwrapper::new();
    longitudes
        .into_iter()
        .map(|lon| unwrapper.unwrap(lon))
        .collect()
}

/// Ground track of `elements` over `window` around `simulated_now`.
///
/// Longitudes are unwrapped. Samples that fail to propagate are dropped.
pub fn build_track(
    elements: &ElementSet,
    simulated_now: Timestamp,
    step: Time,
    window_start: Time,
    window_end: Time,
) -> Vec<GeodeticPoint> {
    let window = TrackWindow {
        start: window_start,
        end: window_end,
        step,
    };
    build_track_with(simulated_now, &window, |t| {
        let state = propagator::propagate(elements, t)?;
        frame::subpoint(&state, t.julian_date())
    })
}

/// Track sampling with an arbitrary subpoint function
pub fn build_track_with<F>(
    simulated_now: Timestamp,
    window: &TrackWindow,
    mut subpoint_at: F,
) -> Vec<GeodeticPoint>
where
    F: FnMut(Timestamp) -> Result<GeodeticPoint, PropagationError>,
{
    let indices = window.sample_indices();
    let mut track = Vec::with_capacity(indices.end.saturating_sub(indices.start) as usize);
    let mut unwrapper = LongitudeUnwrapper::new();

    for k in indices {
        let t = simulated_now + window.step * k;
        match subpoint_at(t) {
            Ok(p) => {
                let lon = unwrapper.unwrap(p.longitude_deg);
                track.push(GeodeticPoint::new(p.latitude_deg, lon));
            }
            Err(e) => {
                debug!(sample = k, at = %t, err = %e, "Skipping track sample");
                unwrapper.reset();
            }
        }
    }

    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::test_elements::iss;

    fn window(start_min: f64, end_min: f64, step_min: f64) -> TrackWindow {
        TrackWindow {
            start: Time::from_minutes(start_min),
            end: Time::from_minutes(end_min),
            step: Time::from_minutes(step_min),
        }
    }

    #[test]
    fn unwrap_across_dateline() {
        assert_eq!(
            unwrap_longitudes([179.0, -179.0, -178.0]),
            vec![179.0, 181.0, 182.0]
        );
        assert_eq!(
            unwrap_longitudes([-179.0, 179.0, 178.0]),
            vec![-179.0, -181.0, -182.0]
        );
        assert_eq!(unwrap_longitudes([10.0, 20.0, 30.0]), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn unwrapped_steps_stay_small() {
        let raw: Vec<f64> = (0..2000)
            .map(|i| tle_types::prelude::wrap_longitude(-170.0 + i as f64 * 4.1))
            .collect();
        let unwrapped = unwrap_longitudes(raw);
        for pair in unwrapped.windows(2) {
            assert!((pair[1] - pair[0]).abs() <= 180.0);
        }
    }

    #[test]
    fn non_finite_longitude_passes_through() {
        let out = unwrap_longitudes([179.0, f64::INFINITY, f64::NAN, -179.0]);
        assert_eq!(out[0], 179.0);
        assert_eq!(out[1], f64::INFINITY);
        assert!(out[2].is_nan());
        assert_eq!(out[3], 181.0);
    }

    #[test]
    fn sample_indices_half_open() {
        assert_eq!(window(-10.0, 90.0, 1.0).sample_indices(), -10..90);
        assert_eq!(window(-10.5, 2.5, 1.0).sample_indices(), -10..3);
        assert_eq!(window(0.0, 0.0, 1.0).sample_indices(), 0..0);
        assert_eq!(window(10.0, 0.0, 1.0).sample_indices(), 0..0);
        assert_eq!(window(-10.0, 90.0, 0.0).sample_indices(), 0..0);
        assert_eq!(window(-10.0, 90.0, -1.0).sample_indices(), 0..0);
    }

    #[test]
    fn failed_sample_resets_unwrap_reference() {
        let now = Timestamp::now();
        let lons = [179.0, -179.0, f64::NAN, -178.0, 179.0];
        let w = window(0.0, 5.0, 1.0);
        let track = build_track_with(now, &w, |t| {
            let k = ((t - now).as_minutes().round()) as usize;
            let lon = lons[k];
            if lon.is_nan() {
                Err(PropagationError::Degenerate("decayed".to_string()))
            } else {
                Ok(GeodeticPoint::new(0.0, lon))
            }
        });
        let track_lons: Vec<f64> = track.iter().map(|p| p.longitude_deg).collect();
        assert_eq!(track_lons, vec![179.0, 181.0, -178.0, -181.0]);
    }

    #[test]
    fn iss_track_is_continuous() {
        let iss = iss();
        let now = iss.epoch() + Time::from_hours(2.0);
        let track = build_track(
            &iss,
            now,
            Time::from_minutes(1.0),
            Time::from_minutes(-10.0),
            Time::from_minutes(90.0),
        );
        assert_eq!(track.len(), 100);
        for pair in track.windows(2) {
            // One minute of LEO ground speed is a few degrees at most
            assert!((pair[1].longitude_deg - pair[0].longitude_deg).abs() < 10.0);
            assert!((pair[1].latitude_deg - pair[0].latitude_deg).abs() < 5.0);
        }
        assert!(track.iter().all(|p| p.latitude_deg.abs() < 52.5));
    }
}
