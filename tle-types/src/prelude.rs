pub use crate::earth::*;
pub use crate::geodetic::*;
pub use crate::state::*;
pub use crate::tle::*;

pub type UtcTimestamp = chrono::DateTime<chrono::Utc>;
