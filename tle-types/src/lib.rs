extern crate nalgebra as na;

pub mod earth;
pub mod geodetic;
pub mod prelude;
pub mod state;
pub mod tle;
