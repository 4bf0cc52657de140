use derive_more::Display;

/// Fixed width of a two-line element data line
pub const TLE_LINE_LEN: usize = 69;

/// Unstructured TLE
/// https://en.wikipedia.org/wiki/Two-line_element_set
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display(fmt = "{}\n{}\n{}", "satellite_name", "line1", "line2")]
pub struct UnstructuredTle {
    pub satellite_name: String,
    pub line1: String,
    pub line2: String,
}

impl UnstructuredTle {
    pub fn new(
        satellite_name: impl Into<String>,
        line1: impl Into<String>,
        line2: impl Into<String>,
    ) -> Self {
        Self {
            satellite_name: satellite_name.into().trim().to_string(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// Satellite catalog number, columns 3-7 of line 1
    pub fn catalog_number(&self) -> Option<u64> {
        self.line1.get(2..7)?.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_number_from_line1() {
        let tle = UnstructuredTle::new(
            "ISS (ZARYA)   ",
            "1 25544U 98067A   23190.50000000  .00016717  00000-0  10270-3 0  9005",
            "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391 59000",
        );
        assert_eq!(tle.satellite_name, "ISS (ZARYA)");
        assert_eq!(tle.catalog_number(), Some(25544));
    }
}
