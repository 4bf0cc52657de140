//! Ground observer location, drawn as its own marker on the map.

use serde::Deserialize;
use std::time::Duration;
use tle_types::prelude::GeodeticPoint;
use tracing::{info, warn};
use url::Url;

use crate::{refresher::FetchError, settings::ObserverSettings};

/// The parts of an ip-api.com style response we use
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct IpLocation {
    #[serde(default)]
    pub status: Option<String>,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl IpLocation {
    pub fn position(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.lat, self.lon)
    }
}

pub async fn locate(url: &Url, timeout: Duration) -> Result<IpLocation, FetchError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let resp = client.get(url.clone()).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(resp.json::<IpLocation>().await?)
}

/// Observer position from the settings.
///
/// When locating is enabled and no fixed position is configured, the host is
/// located by IP address once, falling back to (0, 0) on any failure.
pub fn resolve(settings: &ObserverSettings, timeout: Duration) -> Option<GeodeticPoint> {
    if let Some(pos) = settings.position {
        return Some(pos);
    }
    if !settings.locate {
        return None;
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            warn!(err = %e, "Failed to start a runtime for the observer lookup");
            return Some(GeodeticPoint::default());
        }
    };

    match rt.block_on(locate(&settings.locate_url, timeout)) {
        Ok(loc) => {
            info!(
                lat = loc.lat,
                lon = loc.lon,
                city = loc.city.as_deref().unwrap_or("?"),
                country = loc.country.as_deref().unwrap_or("?"),
                "Located observer"
            );
            Some(loc.position())
        }
        Err(e) => {
            warn!(err = %e, "Observer lookup failed, using (0, 0)");
            Some(GeodeticPoint::default())
        }
    }
}
