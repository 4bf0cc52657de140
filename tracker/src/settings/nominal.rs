//! Defaults used for anything the settings file leaves out

use std::time::Duration;

use crate::units::Time;

use super::{RenderSettings, TimeSettings, TrackSettings};

pub const SOURCE_URL: &str = tle_protocol::CELESTRAK_STATIONS_URL;
pub const SOURCE_LABEL: &str = tle_protocol::ISS_LABEL;
pub const STALE_AFTER: Duration = Duration::from_secs(10 * 60);
pub const REFRESH_PERIOD: Duration = Duration::from_secs(60);
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Free IP geolocation service, only queried when locating is enabled
pub const LOCATE_URL: &str = "http://ip-api.com/json/";
pub const LOCATE_TIMEOUT: Duration = Duration::from_secs(5);

/// Fastest allowed render cadence
pub const MIN_RENDER_PERIOD: Duration = Duration::from_millis(100);

pub const WINDOW_TITLE: &str = "Ground Track";

const NANOS_PER_MINUTE: i64 = 60 * 1_000_000_000;

pub fn time_settings() -> TimeSettings {
    TimeSettings {
        step: Time::from_nanos(NANOS_PER_MINUTE),
    }
}

pub fn track_settings() -> TrackSettings {
    TrackSettings {
        window_start: Time::from_nanos(-10 * NANOS_PER_MINUTE),
        window_end: Time::from_nanos(90 * NANOS_PER_MINUTE),
        step: Time::from_nanos(NANOS_PER_MINUTE),
    }
}

pub fn render_settings() -> RenderSettings {
    RenderSettings {
        period: Duration::from_secs(1),
        width: 1024,
        height: 512,
        base_map: None,
        marker_radius: 6.0,
        observer_radius: 4.0,
        track_width: 2.0,
        title: WINDOW_TITLE.to_string(),
    }
}
