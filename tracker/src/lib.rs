pub extern crate nalgebra as na;

pub mod base_map;
pub mod context;
pub mod elements;
pub mod frame;
pub mod gui;
pub mod observer;
pub mod projector;
pub mod propagator;
pub mod refresher;
pub mod render;
pub mod settings;
pub mod store;
pub mod time_controller;
pub mod track;
pub mod units;

/// Build-time information, see `build.rs`
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));

    pub fn version_string() -> String {
        format!(
            "{} {} ({}, {})",
            PKG_NAME, PKG_VERSION, TARGET, BUILT_TIME_UTC
        )
    }
}
