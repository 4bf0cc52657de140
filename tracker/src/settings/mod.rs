use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tle_types::prelude::GeodeticPoint;
use tracing::info;
use url::Url;

use self::config::{parse_duration, parse_signed_duration, Config};
use crate::{refresher::RefresherConfig, track::TrackWindow, units::Time};

pub mod config;
pub mod nominal;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file '{}'. {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file. {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid duration '{value}' for '{field}'. {source}")]
    Duration {
        field: &'static str,
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("Invalid URL '{value}'. {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid settings. {0}")]
    Invalid(String),
}

/// Fully resolved settings, file values layered over the nominal defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub name: Option<String>,
    pub source: SourceSettings,
    pub time: TimeSettings,
    pub track: TrackSettings,
    pub render: RenderSettings,
    pub observer: ObserverSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub url: Url,
    pub label: String,
    pub stale_after: Duration,
    pub refresh_period: Duration,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSettings {
    /// Offset change per advance/rewind command
    pub step: Time,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSettings {
    pub window_start: Time,
    pub window_end: Time,
    pub step: Time,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub period: Duration,
    pub width: u32,
    pub height: u32,
    /// Equirectangular base map image (PNG/JPEG)
    pub base_map: Option<PathBuf>,
    pub marker_radius: f64,
    pub observer_radius: f64,
    pub track_width: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverSettings {
    pub position: Option<GeodeticPoint>,
    pub locate: bool,
    pub locate_url: Url,
}

impl Settings {
    /// Nominal settings when `config` is `None`
    pub fn load<P: AsRef<Path>>(config: Option<P>) -> Result<Self, SettingsError> {
        match config {
            Some(path) => {
                info!(
                    settings = %path.as_ref().display(),
                    "Loading settings file",
                );
                Self::from_config(&Config::load(path)?)
            }
            None => Self::from_config(&Config::default()),
        }
    }

    pub fn nominal() -> Result<Self, SettingsError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(cfg: &Config) -> Result<Self, SettingsError> {
        let src = cfg.source.clone().unwrap_or_default();
        let source = SourceSettings {
            url: parse_url(src.url.as_deref().unwrap_or(nominal::SOURCE_URL))?,
            label: src
                .label
                .map(|l| l.trim().to_string())
                .unwrap_or_else(|| nominal::SOURCE_LABEL.to_string()),
            stale_after: opt_duration("source.stale-after", &src.stale_after)?
                .unwrap_or(nominal::STALE_AFTER),
            refresh_period: opt_duration("source.refresh-period", &src.refresh_period)?
                .unwrap_or(nominal::REFRESH_PERIOD),
            fetch_timeout: opt_duration("source.fetch-timeout", &src.fetch_timeout)?
                .unwrap_or(nominal::FETCH_TIMEOUT),
        };

        let mut time = nominal::time_settings();
        if let Some(step) = cfg.time.as_ref().and_then(|t| t.step.as_deref()) {
            time.step = Time::from_std_duration(parse_duration("time.step", step)?);
        }

        let mut track = nominal::track_settings();
        if let Some(t) = cfg.track.as_ref() {
            if let Some(s) = t.window_start.as_deref() {
                track.window_start = parse_signed_duration("track.window-start", s)?;
            }
            if let Some(s) = t.window_end.as_deref() {
                track.window_end = parse_signed_duration("track.window-end", s)?;
            }
            if let Some(s) = t.step.as_deref() {
                track.step = Time::from_std_duration(parse_duration("track.step", s)?);
            }
        }

        let mut render = nominal::render_settings();
        if let Some(r) = cfg.render.clone() {
            if let Some(p) = r.period.as_deref() {
                render.period = parse_duration("render.period", p)?;
            }
            render.width = r.width.unwrap_or(render.width);
            render.height = r.height.unwrap_or(render.height);
            render.base_map = r.base_map.or(render.base_map);
            render.marker_radius = r.marker_radius.unwrap_or(render.marker_radius);
            render.observer_radius = r.observer_radius.unwrap_or(render.observer_radius);
            render.track_width = r.track_width.unwrap_or(render.track_width);
            render.title = r.title.unwrap_or(render.title);
        }

        let obs = cfg.observer.clone().unwrap_or_default();
        let observer = ObserverSettings {
            position: obs
                .latitude
                .zip(obs.longitude)
                .map(|(lat, lon)| GeodeticPoint::new(lat, lon)),
            locate: obs.locate.unwrap_or(false),
            locate_url: parse_url(obs.locate_url.as_deref().unwrap_or(nominal::LOCATE_URL))?,
        };

        let settings = Settings {
            name: cfg.name.clone(),
            source,
            time,
            track,
            render,
            observer,
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.source.refresh_period.is_zero() {
            return Err(SettingsError::Invalid(
                "source.refresh-period must be non-zero".to_string(),
            ));
        }
        if self.source.fetch_timeout.is_zero() {
            return Err(SettingsError::Invalid(
                "source.fetch-timeout must be non-zero".to_string(),
            ));
        }
        if !self.time.step.is_positive() {
            return Err(SettingsError::Invalid(
                "time.step must be positive".to_string(),
            ));
        }
        if !self.track.step.is_positive() {
            return Err(SettingsError::Invalid(
                "track.step must be positive".to_string(),
            ));
        }
        if self.track.window_end <= self.track.window_start {
            return Err(SettingsError::Invalid(format!(
                "track window end ({}) must be after its start ({})",
                self.track.window_end, self.track.window_start
            )));
        }
        if self.render.period < nominal::MIN_RENDER_PERIOD {
            return Err(SettingsError::Invalid(format!(
                "render.period must be at least {}",
                humantime::format_duration(nominal::MIN_RENDER_PERIOD)
            )));
        }
        Ok(())
    }

    pub fn refresher_config(&self) -> RefresherConfig {
        RefresherConfig {
            period: self.source.refresh_period,
            fetch_timeout: self.source.fetch_timeout,
        }
    }

    pub fn track_window(&self) -> TrackWindow {
        TrackWindow {
            start: self.track.window_start,
            end: self.track.window_end,
            step: self.track.step,
        }
    }

    pub fn stale_threshold(&self) -> Time {
        Time::from_std_duration(self.source.stale_after)
    }
}

pub fn parse_url(value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|source| SettingsError::Url {
        value: value.to_string(),
        source,
    })
}

fn opt_duration(
    field: &'static str,
    value: &Option<String>,
) -> Result<Option<Duration>, SettingsError> {
    value
        .as_deref()
        .map(|v| parse_duration(field, v))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn nominal_settings() {
        let s = Settings::nominal().unwrap();
        assert_eq!(s.source.url.as_str(), nominal::SOURCE_URL);
        assert_eq!(s.source.label, "ISS (ZARYA)");
        assert_eq!(s.stale_threshold(), Time::from_secs(600.0));
        assert_eq!(s.source.refresh_period, Duration::from_secs(60));
        assert_eq!(s.source.fetch_timeout, Duration::from_secs(10));
        assert_eq!(s.time.step, Time::from_minutes(1.0));
        assert_eq!(
            s.track_window(),
            TrackWindow {
                start: Time::from_minutes(-10.0),
                end: Time::from_minutes(90.0),
                step: Time::from_minutes(1.0),
            }
        );
        assert_eq!(s.render.period, Duration::from_secs(1));
        assert!(s.observer.position.is_none());
        assert!(!s.observer.locate);
    }

    #[test]
    fn file_values_override_nominal() {
        let cfg = Config::from_str_checked(indoc! {r#"
            [source]
            label = "  HST  "
            refresh-period = "5m"

            [track]
            window-start = "-45m"
            step = "30s"

            [render]
            period = "250ms"
            width = 2048

            [observer]
            latitude = -33.9
            longitude = 151.2
        "#})
        .unwrap();
        let s = Settings::from_config(&cfg).unwrap();
        assert_eq!(s.source.label, "HST");
        assert_eq!(s.source.refresh_period, Duration::from_secs(300));
        assert_eq!(s.source.fetch_timeout, nominal::FETCH_TIMEOUT);
        assert_eq!(s.track.window_start, Time::from_minutes(-45.0));
        assert_eq!(s.track.window_end, Time::from_minutes(90.0));
        assert_eq!(s.track.step, Time::from_secs(30.0));
        assert_eq!(s.render.period, Duration::from_millis(250));
        assert_eq!(s.render.width, 2048);
        assert_eq!(s.render.height, 512);
        assert_eq!(s.observer.position, Some(GeodeticPoint::new(-33.9, 151.2)));
    }

    #[test]
    fn rejects_inverted_track_window() {
        let cfg = Config::from_str_checked(indoc! {r#"
            [track]
            window-start = "10m"
            window-end = "-10m"
        "#})
        .unwrap();
        assert!(matches!(
            Settings::from_config(&cfg),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_fast_render_period() {
        let cfg = Config::from_str_checked("[render]\nperiod = \"10ms\"\n").unwrap();
        assert!(matches!(
            Settings::from_config(&cfg),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_bad_url_and_duration() {
        let cfg = Config::from_str_checked("[source]\nurl = \"not a url\"\n").unwrap();
        assert!(matches!(
            Settings::from_config(&cfg),
            Err(SettingsError::Url { .. })
        ));

        let cfg = Config::from_str_checked("[source]\nstale-after = \"ten minutes\"\n").unwrap();
        assert!(matches!(
            Settings::from_config(&cfg),
            Err(SettingsError::Duration {
                field: "source.stale-after",
                ..
            })
        ));
    }
}
