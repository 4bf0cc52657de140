use tle_types::prelude::{UnstructuredTle, MINUTES_PER_DAY};

use crate::units::{JulianDate, Time, Timestamp};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ElementsError {
    #[error("Failed to read the element lines of '{name}'. {reason}")]
    Tle { name: String, reason: String },
    #[error("SGP4 rejected the elements of '{name}'. {reason}")]
    Model { name: String, reason: String },
}

/// Parsed, immutable orbital element set along with its initialized SGP4 model.
///
/// Replaced wholesale when a newer set arrives, never mutated.
#[derive(Debug, Clone)]
pub struct ElementSet {
    tle: UnstructuredTle,
    epoch: Timestamp,
    epoch_jd: JulianDate,
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

impl ElementSet {
    pub fn from_tle(tle: UnstructuredTle) -> Result<Self, ElementsError> {
        let elements = sgp4::Elements::from_tle(
            Some(tle.satellite_name.clone()),
            tle.line1.as_bytes(),
            tle.line2.as_bytes(),
        )
        .map_err(|e| ElementsError::Tle {
            name: tle.satellite_name.clone(),
            reason: e.to_string(),
        })?;
        let constants =
            sgp4::Constants::from_elements(&elements).map_err(|e| ElementsError::Model {
                name: tle.satellite_name.clone(),
                reason: e.to_string(),
            })?;
        let epoch = Timestamp::from_utc(elements.datetime.and_utc());

        Ok(Self {
            tle,
            epoch,
            epoch_jd: epoch.julian_date(),
            elements,
            constants,
        })
    }

    pub fn name(&self) -> &str {
        &self.tle.satellite_name
    }

    pub fn tle(&self) -> &UnstructuredTle {
        &self.tle
    }

    pub fn catalog_number(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> Timestamp {
        self.epoch
    }

    pub fn epoch_julian_date(&self) -> JulianDate {
        self.epoch_jd
    }

    /// Time from the element epoch to `t`, negative before the epoch
    pub fn age_at(&self, t: Timestamp) -> Time {
        t - self.epoch
    }

    /// Mean motion [rev/day]
    pub fn mean_motion(&self) -> f64 {
        self.elements.mean_motion
    }

    pub fn orbital_period(&self) -> Time {
        Time::from_minutes(MINUTES_PER_DAY / self.elements.mean_motion)
    }

    pub fn elements(&self) -> &sgp4::Elements {
        &self.elements
    }

    pub fn constants(&self) -> &sgp4::Constants {
        &self.constants
    }
}

#[cfg(test)]
pub(crate) mod test_elements {
    use super::*;

    pub const ISS_NAME: &str = "ISS (ZARYA)";
    pub const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    pub const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    pub fn iss() -> ElementSet {
        ElementSet::from_tle(UnstructuredTle::new(ISS_NAME, ISS_LINE1, ISS_LINE2)).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_elements::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn epoch_and_period() {
        let iss = iss();
        assert_eq!(iss.name(), ISS_NAME);
        assert_eq!(iss.catalog_number(), 25544);
        assert_eq!(
            iss.epoch().as_utc().format("%Y-%m-%d %H:%M").to_string(),
            "2008-09-20 12:25"
        );
        assert_relative_eq!(iss.orbital_period().as_minutes(), 91.6, epsilon = 0.1);
    }

    #[test]
    fn rejects_garbage_lines() {
        let res = ElementSet::from_tle(UnstructuredTle::new(
            "JUNK",
            "1 this is not an element line",
            ISS_LINE2,
        ));
        assert!(matches!(res, Err(ElementsError::Tle { .. })));
    }
}
