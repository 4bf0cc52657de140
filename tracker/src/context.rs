use std::sync::Arc;
use tle_types::prelude::GeodeticPoint;
use tracing::debug;

use crate::{
    base_map::BaseMap, projector::Viewport, settings::Settings, store::ElementSetStore,
    time_controller::TimeController,
};

/// Everything the render path reads, owned by the GUI thread.
///
/// The store handle is the only piece shared with the refresher.
#[derive(Debug)]
pub struct TrackerContext {
    pub store: ElementSetStore,
    pub time: TimeController,
    pub settings: Settings,
    pub viewport: Viewport,
    pub observer: Option<GeodeticPoint>,
    pub base_map: Option<Arc<BaseMap>>,
}

impl TrackerContext {
    pub fn new(settings: Settings, store: ElementSetStore) -> Self {
        Self {
            time: TimeController::new(settings.time.step),
            viewport: Viewport::new(
                f64::from(settings.render.width),
                f64::from(settings.render.height),
            ),
            store,
            settings,
            observer: None,
            base_map: None,
        }
    }

    pub fn with_observer(mut self, observer: Option<GeodeticPoint>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_base_map(mut self, base_map: Option<Arc<BaseMap>>) -> Self {
        self.base_map = base_map;
        self
    }

    /// Returns true if the viewport changed
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if width <= 0.0 || height <= 0.0 {
            // Minimized windows report a zero size, keep the last usable one
            return false;
        }
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return false;
        }
        debug!(width, height, "Viewport resized");
        self.viewport = viewport;
        true
    }
}
