//! Frame building and drawing.
//!
//! `render_frame` is pure, bounded-time work over the context: it never touches
//! the network or blocks on the refresher. Drawing goes through `DrawingSurface`
//! so the geometry can be checked without a window.

use std::{
    fmt::Write,
    sync::Arc,
    time::{Duration, Instant},
};
use tle_types::prelude::{GeodeticPoint, PixelPoint};
use tracing::{debug, warn};

use crate::{
    base_map::BaseMap,
    context::TrackerContext,
    frame,
    projector::{project, project_track, project_wrapped, Viewport},
    propagator::{self, PropagationError},
    settings::RenderSettings,
    track::build_track,
    units::Timestamp,
};

pub type Rgb = [f32; 3];

pub const SUBPOINT_RGB: Rgb = [0.7, 0.2, 1.0];
pub const TRACK_RGB: Rgb = [0.2, 0.6, 1.0];
pub const OBSERVER_RGB: Rgb = [1.0, 0.0, 0.0];
pub const TEXT_RGB: Rgb = [1.0, 1.0, 1.0];
pub const WARNING_RGB: Rgb = [1.0, 0.5, 0.0];
pub const GRATICULE_RGB: Rgb = [0.25, 0.25, 0.3];
pub const EQUATOR_RGB: Rgb = [0.4, 0.4, 0.5];

pub const LABEL_TEXT_SCALE: f64 = 28.0;
pub const INFO_TEXT_SCALE: f64 = 20.0;

const TEXT_MARGIN: f64 = 8.0;
const GRATICULE_SPACING_DEG: i32 = 30;

/// Canvas primitives, pixel coordinates with the origin at the top-left
pub trait DrawingSurface {
    fn clear_all(&mut self);

    /// Draw `image` stretched over the `size` rectangle starting at `origin`
    fn draw_image(&mut self, origin: PixelPoint, image: &BaseMap, size: Viewport);

    fn draw_circle(&mut self, center: PixelPoint, radius: f64, color: Rgb);

    fn draw_polyline(&mut self, points: &[PixelPoint], color: Rgb, width: f64);

    /// `position` is the top-left corner of the text
    fn draw_text(&mut self, position: PixelPoint, text: &str, size: f64, color: Rgb);
}

#[derive(Clone, Debug, PartialEq)]
pub enum FrameStatus {
    Tracking,
    /// No element set was ever loaded
    NoData,
    /// The subpoint could not be computed for the simulated now
    Degraded(String),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SubpointFix {
    pub position: GeodeticPoint,
    pub pixel: PixelPoint,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub status: FrameStatus,
    pub simulated_now: Timestamp,
    /// `<simulated UTC> (offset <±duration>)`
    pub label: String,
    /// Object name, position and element set age
    pub details: Option<String>,
    pub subpoint: Option<SubpointFix>,
    /// Track polylines, split where the track crosses the map edge
    pub track: Vec<Vec<PixelPoint>>,
    pub observer: Option<PixelPoint>,
    pub viewport: Viewport,
    pub base_map: Option<Arc<BaseMap>>,
}

/// Build the frame for `real_now` from the current context
pub fn render_frame(ctx: &TrackerContext, real_now: Timestamp) -> Frame {
    let viewport = ctx.viewport;
    let simulated_now = ctx.time.simulated_now(real_now);
    let label = format!(
        "{simulated_now} (offset {})",
        ctx.time.offset().round_secs()
    );
    let observer = ctx.observer.map(|o| project_wrapped(&o, &viewport));

    let mut frame = Frame {
        status: FrameStatus::NoData,
        simulated_now,
        label,
        details: None,
        subpoint: None,
        track: Vec::new(),
        observer,
        viewport,
        base_map: ctx.base_map.clone(),
    };

    let Some(elements) = ctx.store.current_elements() else {
        return frame;
    };

    let fix = propagator::propagate(&elements, simulated_now)
        .and_then(|state| frame::subpoint(&state, simulated_now.julian_date()));
    let mut details = String::with_capacity(128);
    let _ = write!(
        &mut details,
        "{} #{}",
        elements.name(),
        elements.catalog_number()
    );
    match fix {
        Ok(position) => {
            let _ = write!(
                &mut details,
                "  lat {:.2}°  lon {:.2}°",
                position.latitude_deg, position.longitude_deg
            );
            frame.status = FrameStatus::Tracking;
            frame.subpoint = Some(SubpointFix {
                position,
                pixel: project(&position, &viewport),
            });
        }
        Err(e) => {
            warn!(at = %simulated_now, err = %e, "Failed to place the tracked object");
            frame.status = FrameStatus::Degraded(e.to_string());
        }
    }
    let _ = write!(
        &mut details,
        "  epoch age {}",
        elements.age_at(simulated_now).round_secs()
    );
    frame.details = Some(details);

    let track = build_track(
        &elements,
        simulated_now,
        ctx.settings.track.step,
        ctx.settings.track.window_start,
        ctx.settings.track.window_end,
    );
    frame.track = project_track(&track, &viewport);

    frame
}

/// Fixed-period trigger, fires at most once per period and never blocks
#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// The first poll always fires
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                // Skip missed periods instead of firing a burst
                let next = due + self.period;
                self.next_due = Some(if next <= now { now + self.period } else { next });
                true
            }
            None => {
                self.next_due = Some(now + self.period);
                true
            }
        }
    }

    /// Make the next poll fire
    pub fn expire(&mut self) {
        self.next_due = None;
    }
}

/// Keeps the frame on display up to date with the ticker
#[derive(Debug)]
pub struct RenderDriver {
    ticker: Ticker,
    frame: Option<Frame>,
}

impl RenderDriver {
    pub fn new(period: Duration) -> Self {
        Self {
            ticker: Ticker::new(period),
            frame: None,
        }
    }

    /// Recompute on the next tick, e.g. after a resize or a time command
    pub fn invalidate(&mut self) {
        self.ticker.expire();
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Returns true when a new frame was built
    pub fn tick(&mut self, ctx: &TrackerContext, real_now: Timestamp, now: Instant) -> bool {
        if !self.ticker.poll(now) {
            return false;
        }

        let next = render_frame(ctx, real_now);
        if let FrameStatus::Degraded(reason) = &next.status {
            // A degraded frame only replaces a previous one drawn for another viewport
            if let Some(prev) = self.frame.as_ref() {
                if prev.viewport == next.viewport {
                    debug!(reason = %reason, "Keeping the previous frame");
                    return false;
                }
            }
        }
        self.frame = Some(next);
        true
    }
}

/// Emit `frame` to `surface`
pub fn draw_frame<S: DrawingSurface + ?Sized>(
    frame: &Frame,
    style: &RenderSettings,
    surface: &mut S,
) {
    surface.clear_all();

    match frame.base_map.as_deref() {
        Some(map) => surface.draw_image(PixelPoint::new(0.0, 0.0), map, frame.viewport),
        None => draw_graticule(&frame.viewport, surface),
    }

    for run in frame.track.iter().filter(|r| r.len() > 1) {
        surface.draw_polyline(run, TRACK_RGB, style.track_width);
    }

    if let Some(obs) = frame.observer {
        surface.draw_circle(obs, style.observer_radius, OBSERVER_RGB);
    }

    if let Some(fix) = frame.subpoint {
        surface.draw_circle(fix.pixel, style.marker_radius, SUBPOINT_RGB);
    }

    let mut pos = PixelPoint::new(TEXT_MARGIN, TEXT_MARGIN);
    surface.draw_text(pos, &frame.label, LABEL_TEXT_SCALE, TEXT_RGB);
    pos.y += LABEL_TEXT_SCALE;

    if let Some(details) = frame.details.as_deref() {
        surface.draw_text(pos, details, INFO_TEXT_SCALE, TEXT_RGB);
        pos.y += INFO_TEXT_SCALE;
    }

    match &frame.status {
        FrameStatus::Tracking => (),
        FrameStatus::NoData => {
            surface.draw_text(pos, "no element set loaded", INFO_TEXT_SCALE, WARNING_RGB)
        }
        FrameStatus::Degraded(reason) => surface.draw_text(
            pos,
            &format!("position unavailable: {reason}"),
            INFO_TEXT_SCALE,
            WARNING_RGB,
        ),
    }
}

/// Map stand-in when there is no base map image
pub fn draw_graticule<S: DrawingSurface + ?Sized>(viewport: &Viewport, surface: &mut S) {
    for lon in (-180..=180).step_by(GRATICULE_SPACING_DEG as usize) {
        let top = project(&GeodeticPoint::new(90.0, f64::from(lon)), viewport);
        let bottom = project(&GeodeticPoint::new(-90.0, f64::from(lon)), viewport);
        surface.draw_polyline(&[top, bottom], GRATICULE_RGB, 1.0);
    }
    for lat in (-90..=90).step_by(GRATICULE_SPACING_DEG as usize) {
        let west = project(&GeodeticPoint::new(f64::from(lat), -180.0), viewport);
        let east = project(&GeodeticPoint::new(f64::from(lat), 180.0), viewport);
        let color = if lat == 0 { EQUATOR_RGB } else { GRATICULE_RGB };
        surface.draw_polyline(&[west, east], color, 1.0);
    }
}

/// Convenience for callers that only care about the subpoint
pub fn subpoint_at(
    ctx: &TrackerContext,
    real_now: Timestamp,
) -> Result<GeodeticPoint, PropagationError> {
    let simulated_now = ctx.time.simulated_now(real_now);
    let state = propagator::propagate_current(&ctx.store, simulated_now)?;
    frame::subpoint(&state, simulated_now.julian_date())
}


#[cfg(test)]
mod tests {
    use super::test_surface::*;
    use super::*;
    use tle_types::prelude::UnstructuredTle;
    use crate::{
        base_map::ImageFormat,
        elements::{
            test_elements::{iss, ISS_LINE2},
            ElementSet,
        },
        settings::Settings,
        store::ElementSetStore,
        time_controller::TimeCommand,
        units::Time,
    };

    fn context() -> TrackerContext {
        let settings = Settings::nominal().unwrap();
        let store = ElementSetStore::new(settings.source.label.clone(), settings.stale_threshold());
        TrackerContext::new(settings, store)
    }

    fn loaded_context() -> (TrackerContext, Timestamp) {
        let ctx = context();
        let iss = Arc::new(iss());
        let now = iss.epoch() + Time::from_hours(3.0);
        ctx.store.replace(iss, now);
        (ctx, now)
    }

    #[test]
    fn ticker_fires_once_per_period() {
        let start = Instant::now();
        let mut t = Ticker::new(Duration::from_millis(100));
        assert!(t.poll(start));
        assert!(!t.poll(start));
        assert!(!t.poll(start + Duration::from_millis(99)));
        assert!(t.poll(start + Duration::from_millis(100)));
        assert!(!t.poll(start + Duration::from_millis(150)));
        // Long stall, no catch-up burst
        assert!(t.poll(start + Duration::from_secs(5)));
        assert!(!t.poll(start + Duration::from_millis(5050)));
        t.expire();
        assert!(t.poll(start + Duration::from_millis(5050)));
    }

    #[test]
    fn no_data_frame() {
        let ctx = context();
        let now = Timestamp::now();
        let frame = render_frame(&ctx, now);
        assert_eq!(frame.status, FrameStatus::NoData);
        assert_eq!(frame.simulated_now, now);
        assert!(frame.subpoint.is_none());
        assert!(frame.track.is_empty());
        assert!(frame.label.ends_with("(offset +0s)"));

        let mut surface = RecordingSurface::default();
        draw_frame(&frame, &ctx.settings.render, &mut surface);
        assert_eq!(surface.calls[0], DrawCall::Clear);
        assert!(surface.calls.contains(&DrawCall::Text(
            "no element set loaded".to_string(),
            WARNING_RGB
        )));
        // Graticule stands in for the missing base map
        assert!(surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Polyline(2, rgb) if *rgb == EQUATOR_RGB)));
    }

    #[test]
    fn tracking_frame() {
        let (mut ctx, now) = loaded_context();
        ctx.observer = Some(GeodeticPoint::new(0.0, 0.0));
        let frame = render_frame(&ctx, now);
        assert_eq!(frame.status, FrameStatus::Tracking);

        let fix = frame.subpoint.unwrap();
        assert_eq!(fix.pixel, project(&fix.position, &ctx.viewport));
        assert!(fix.pixel.x >= 0.0 && fix.pixel.x <= ctx.viewport.width);
        assert!(fix.pixel.y >= 0.0 && fix.pixel.y <= ctx.viewport.height);
        assert_eq!(frame.observer, Some(ctx.viewport.center()));

        let points: usize = frame.track.iter().map(|r| r.len()).sum();
        assert!(points >= 100);
        for run in frame.track.iter() {
            for pair in run.windows(2) {
                assert!((pair[1].x - pair[0].x).abs() < ctx.viewport.width / 2.0);
            }
        }
        assert!(frame.details.as_deref().unwrap().starts_with("ISS (ZARYA) #25544"));

        let mut surface = RecordingSurface::default();
        draw_frame(&frame, &ctx.settings.render, &mut surface);
        assert!(surface.calls.contains(&DrawCall::Circle(
            fix.pixel,
            ctx.settings.render.marker_radius,
            SUBPOINT_RGB
        )));
        assert!(surface.calls.contains(&DrawCall::Circle(
            ctx.viewport.center(),
            ctx.settings.render.observer_radius,
            OBSERVER_RGB
        )));
        assert!(surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Polyline(_, rgb) if *rgb == TRACK_RGB)));
    }

    #[test]
    fn time_commands_move_the_frame() {
        let (mut ctx, now) = loaded_context();
        ctx.time.apply(TimeCommand::Advance);
        ctx.time.apply(TimeCommand::Advance);
        let frame = render_frame(&ctx, now);
        assert_eq!(frame.simulated_now, now + Time::from_minutes(2.0));
        assert!(frame.label.ends_with("(offset +2m)"));

        let expected = subpoint_at(&ctx, now).unwrap();
        assert_eq!(frame.subpoint.unwrap().position, expected);
    }

    #[test]
    fn resize_reprojects() {
        let (mut ctx, now) = loaded_context();
        let small = render_frame(&ctx, now).subpoint.unwrap();
        assert!(ctx.resize(2048.0, 1024.0));
        assert!(!ctx.resize(2048.0, 1024.0));
        assert!(!ctx.resize(0.0, 0.0));
        let big = render_frame(&ctx, now).subpoint.unwrap();
        assert_eq!(small.position, big.position);
        assert!((big.pixel.x - 2.0 * small.pixel.x).abs() < 1e-9);
        assert!((big.pixel.y - 2.0 * small.pixel.y).abs() < 1e-9);
    }

    #[test]
    fn driver_recomputes_after_invalidate() {
        let (mut ctx, now) = loaded_context();
        let start = Instant::now();
        let mut driver = RenderDriver::new(Duration::from_secs(1));
        assert!(driver.tick(&ctx, now, start));
        assert!(!driver.tick(&ctx, now, start));

        ctx.time.apply(TimeCommand::Rewind);
        driver.invalidate();
        assert!(driver.tick(&ctx, now, start));
        assert_eq!(
            driver.frame().unwrap().simulated_now,
            now - Time::from_minutes(1.0)
        );
    }

    /// Drag term large enough for the orbit to decay within a day
    const DECAYING_LINE1: &str =
        "1 25544U 98067A   08264.51782528  .50000000  00000-0  99999-0 0  2924";

    #[test]
    fn degraded_frame_keeps_previous_until_resize() {
        let mut ctx = context();
        let set = ElementSet::from_tle(UnstructuredTle::new(
            "DECAYING",
            DECAYING_LINE1,
            ISS_LINE2,
        ))
        .unwrap();
        let epoch = set.epoch();
        ctx.store.replace(Arc::new(set), epoch);

        let start = Instant::now();
        let mut driver = RenderDriver::new(Duration::from_secs(1));
        assert!(driver.tick(&ctx, epoch, start));
        let tracking = driver.frame().unwrap().clone();
        assert_eq!(tracking.status, FrameStatus::Tracking);

        let decayed = epoch + Time::from_hours(24.0);
        let frame = render_frame(&ctx, decayed);
        assert!(matches!(frame.status, FrameStatus::Degraded(_)));
        assert!(frame.subpoint.is_none());
        assert!(frame.details.is_some());

        driver.invalidate();
        assert!(!driver.tick(&ctx, decayed, start));
        let shown = driver.frame().unwrap();
        assert_eq!(shown.status, FrameStatus::Tracking);
        assert_eq!(shown.simulated_now, tracking.simulated_now);
        assert_eq!(shown.subpoint, tracking.subpoint);

        assert!(ctx.resize(2048.0, 1024.0));
        driver.invalidate();
        assert!(driver.tick(&ctx, decayed, start));
        let shown = driver.frame().unwrap();
        assert!(matches!(shown.status, FrameStatus::Degraded(_)));
        assert_eq!(shown.viewport, Viewport::new(2048.0, 1024.0));
        assert!(shown.subpoint.is_none());
    }

    #[test]
    fn base_map_replaces_graticule() {
        let ctx = context().with_base_map(Some(Arc::new(BaseMap {
            name: "earth".to_string(),
            format: ImageFormat::Jpeg,
            bytes: vec![0xFF, 0xD8, 0xFF],
        })));
        let frame = render_frame(&ctx, Timestamp::now());
        let mut surface = RecordingSurface::default();
        draw_frame(&frame, &ctx.settings.render, &mut surface);
        assert_eq!(
            surface.calls[1],
            DrawCall::Image("earth".to_string(), ctx.viewport)
        );
        assert!(!surface
            .calls
            .iter()
            .any(|c| matches!(c, DrawCall::Polyline(..))));
    }
}
