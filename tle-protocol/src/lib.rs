pub use crate::parser::{find_element_set, LineFault, ParseError};

pub mod parser;

/// Default source of the tracked element set
pub const CELESTRAK_STATIONS_URL: &str = "https://celestrak.org/NORAD/elements/stations.txt";
/// Default tracked object label
pub const ISS_LABEL: &str = "ISS (ZARYA)";
pub const LINE1_NUMBER: char = '1';
pub const LINE2_NUMBER: char = '2';
