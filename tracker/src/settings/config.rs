//! Raw settings file contents, every field optional

use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf, time::Duration};

use super::SettingsError;
use crate::units::Time;

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub name: Option<String>,
    pub source: Option<Source>,
    #[serde(alias = "time-control")]
    pub time: Option<TimeControl>,
    pub track: Option<Track>,
    pub render: Option<Render>,
    pub observer: Option<Observer>,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str_checked(&content)
    }

    pub fn from_str_checked(s: &str) -> Result<Self, SettingsError> {
        let cfg: Config = toml::from_str(s)?;

        if let Some(src) = cfg.source.as_ref() {
            if let Some(label) = src.label.as_ref() {
                if label.trim().is_empty() {
                    return Err(SettingsError::Invalid(
                        "source label must not be empty".to_string(),
                    ));
                }
            }
        }

        if let Some(obs) = cfg.observer.as_ref() {
            if obs.latitude.is_some() != obs.longitude.is_some() {
                return Err(SettingsError::Invalid(
                    "observer needs both latitude and longitude".to_string(),
                ));
            }
            if let Some(lat) = obs.latitude {
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(SettingsError::Invalid(format!(
                        "observer latitude {lat} is outside [-90, 90]"
                    )));
                }
            }
            if let Some(lon) = obs.longitude {
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(SettingsError::Invalid(format!(
                        "observer longitude {lon} is outside [-180, 180]"
                    )));
                }
            }
        }

        if let Some(render) = cfg.render.as_ref() {
            if render.width == Some(0) || render.height == Some(0) {
                return Err(SettingsError::Invalid(
                    "window dimensions must be non-zero".to_string(),
                ));
            }
        }

        Ok(cfg)
    }
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Source {
    pub url: Option<String>,
    pub label: Option<String>,
    pub stale_after: Option<String>,
    pub refresh_period: Option<String>,
    pub fetch_timeout: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TimeControl {
    pub step: Option<String>,
}

/// Window bounds are signed offsets from the simulated now, e.g. `"-10m"`
#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Track {
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub step: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Render {
    pub period: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub base_map: Option<PathBuf>,
    pub marker_radius: Option<f64>,
    pub observer_radius: Option<f64>,
    pub track_width: Option<f64>,
    pub title: Option<String>,
}

#[derive(Clone, PartialEq, Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Observer {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Look the observer up by IP address at startup
    pub locate: Option<bool>,
    pub locate_url: Option<String>,
}

pub(crate) fn parse_duration(field: &'static str, value: &str) -> Result<Duration, SettingsError> {
    humantime::parse_duration(value.trim()).map_err(|source| SettingsError::Duration {
        field,
        value: value.to_string(),
        source,
    })
}

/// Like `parse_duration`, with an optional leading '-'
pub fn parse_signed_duration(field: &'static str, value: &str) -> Result<Time, SettingsError> {
    let value = value.trim();
    match value.strip_prefix('-') {
        Some(magnitude) => Ok(-Time::from_std_duration(parse_duration(field, magnitude)?)),
        None => Ok(Time::from_std_duration(parse_duration(
            field,
            value.strip_prefix('+').unwrap_or(value),
        )?)),
    }
}
