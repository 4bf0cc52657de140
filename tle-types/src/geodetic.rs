use derive_more::Display;

/// Subpoint on the Earth's surface.
///
/// Latitude is geocentric, see `tracker_lib::frame`.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[display(fmt = "{{lat: {:.4}°, lon: {:.4}°}}", "latitude_deg", "longitude_deg")]
pub struct GeodeticPoint {
    /// [deg], in [-90, 90]
    pub latitude_deg: f64,

    /// [deg], in (-180, 180] unless the point was produced by longitude unwrapping
    pub longitude_deg: f64,
}

impl GeodeticPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    /// Same point with the longitude folded back into (-180, 180]
    pub fn wrapped(self) -> Self {
        Self {
            latitude_deg: self.latitude_deg,
            longitude_deg: wrap_longitude(self.longitude_deg),
        }
    }
}

/// Fold any longitude into (-180, 180]
pub fn wrap_longitude(longitude_deg: f64) -> f64 {
    let lon = (longitude_deg + 180.0).rem_euclid(360.0) - 180.0;
    if lon <= -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Viewport position [px], origin at the top-left corner, y pointing down
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default, Display)]
#[display(fmt = "({:.1}, {:.1})", "x", "y")]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
