use kiss3d::{
    camera::FixedView,
    event::{Action, Key, WindowEvent},
    planar_camera,
    planar_scene::PlanarSceneNode,
    text::Font,
    window::Window,
};
use na::{Point2, Point3, Translation2};
use std::rc::Rc;
use tle_types::prelude::PixelPoint;
use tracing::debug;

use crate::{
    base_map::BaseMap,
    built_info,
    projector::Viewport,
    render::{DrawingSurface, Rgb},
    time_controller::TimeCommand,
};

const CIRCLE_SEGMENTS: usize = 24;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GuiEvent {
    Time(TimeCommand),
    Resize(Viewport),
    Quit,
}

/// Map window, drawn with kiss3d planar primitives.
///
/// Planar coordinates have their origin at the window center with y up, the
/// drawing surface interface uses top-left pixel coordinates. Both cameras are
/// fixed so mouse input can't pan or zoom the map away from the window.
pub struct GuiState {
    window: Window,
    cam: FixedView,
    planar_cam: planar_camera::FixedView,
    font: Rc<Font>,
    base_map_node: Option<PlanarSceneNode>,
    base_map_key: Option<String>,
}

impl GuiState {
    pub fn new(win_title: &str, viewport: Viewport) -> Self {
        let mut window =
            Window::new_with_size(win_title, viewport.width as u32, viewport.height as u32);
        window.set_background_color(0.05, 0.05, 0.1);

        println!("----------------------------------------------");
        println!("|               GUI key map                  |");
        println!("----------------------------------------------");
        println!("LEFT  : rewind time");
        println!("RIGHT : advance time");
        println!("SPACE : reset to real time");
        println!("ESC   : exit");
        println!("----------------------------------------------");
        println!("{}", built_info::version_string());

        Self {
            window,
            cam: FixedView::new(),
            planar_cam: planar_camera::FixedView::new(),
            font: Font::default(),
            base_map_node: None,
            base_map_key: None,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            f64::from(self.window.width()),
            f64::from(self.window.height()),
        )
    }

    /// Present what was drawn since the last call, returns false once the window closed
    pub fn present(&mut self) -> bool {
        self.window
            .render_with_cameras(&mut self.cam, &mut self.planar_cam)
    }

    pub fn events(&mut self) -> Vec<GuiEvent> {
        let mut out = Vec::new();
        for event in self.window.events().iter() {
            match event.value {
                WindowEvent::Key(key, Action::Press, _) => match key {
                    Key::Left => out.push(GuiEvent::Time(TimeCommand::Rewind)),
                    Key::Right => out.push(GuiEvent::Time(TimeCommand::Advance)),
                    Key::Space => out.push(GuiEvent::Time(TimeCommand::Reset)),
                    Key::Escape => out.push(GuiEvent::Quit),
                    _ => (),
                },
                WindowEvent::FramebufferSize(w, h) => {
                    debug!(w, h, "Framebuffer resized");
                    out.push(GuiEvent::Resize(Viewport::new(f64::from(w), f64::from(h))));
                }
                WindowEvent::Close => out.push(GuiEvent::Quit),
                _ => (),
            }
        }
        out
    }

    fn planar(&self, p: PixelPoint) -> Point2<f32> {
        to_planar(p, &self.viewport())
    }

    fn line(&mut self, a: PixelPoint, b: PixelPoint, color: &Point3<f32>) {
        let a = self.planar(a);
        let b = self.planar(b);
        self.window.draw_planar_line(&a, &b, color);
    }
}

/// Top-left pixel coordinates to the fixed planar camera's centered, y-up ones
pub fn to_planar(p: PixelPoint, viewport: &Viewport) -> Point2<f32> {
    Point2::new(
        (p.x - viewport.width / 2.0) as f32,
        (viewport.height / 2.0 - p.y) as f32,
    )
}

impl DrawingSurface for GuiState {
    fn clear_all(&mut self) {
        // Lines and text only live for one rendered frame, the map node persists
        if let Some(node) = self.base_map_node.as_mut() {
            node.set_visible(false);
        }
    }

    fn draw_image(&mut self, origin: PixelPoint, image: &BaseMap, size: Viewport) {
        if self.base_map_key.as_deref() != Some(image.name.as_str()) {
            if let Some(mut old) = self.base_map_node.take() {
                old.unlink();
            }
            let mut node = self.window.add_rectangle(1.0, 1.0);
            node.set_texture_from_memory(&image.bytes, &image.name);
            self.base_map_node = Some(node);
            self.base_map_key = Some(image.name.clone());
        }

        let center = self.planar(PixelPoint::new(
            origin.x + size.width / 2.0,
            origin.y + size.height / 2.0,
        ));
        if let Some(node) = self.base_map_node.as_mut() {
            node.set_local_scale(size.width as f32, size.height as f32);
            node.set_local_translation(Translation2::new(center.x, center.y));
            node.set_visible(true);
        }
    }

    fn draw_circle(&mut self, center: PixelPoint, radius: f64, color: Rgb) {
        let color = Point3::from(color);
        // Concentric rings fill the disc
        let mut r = radius;
        while r > 0.0 {
            let ring: Vec<PixelPoint> = (0..=CIRCLE_SEGMENTS)
                .map(|i| {
                    let a = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
                    PixelPoint::new(center.x + r * a.cos(), center.y + r * a.sin())
                })
                .collect();
            for pair in ring.windows(2) {
                self.line(pair[0], pair[1], &color);
            }
            r -= 1.0;
        }
    }

    fn draw_polyline(&mut self, points: &[PixelPoint], color: Rgb, width: f64) {
        let color = Point3::from(color);
        // Planar lines are one pixel wide, wider lines are drawn as parallel strokes
        let strokes = width.round().max(1.0) as usize;
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let len = dx.hypot(dy);
            if len == 0.0 {
                continue;
            }
            let (nx, ny) = (-dy / len, dx / len);
            for s in 0..strokes {
                let off = s as f64 - (strokes - 1) as f64 / 2.0;
                self.line(
                    PixelPoint::new(a.x + nx * off, a.y + ny * off),
                    PixelPoint::new(b.x + nx * off, b.y + ny * off),
                    &color,
                );
            }
        }
    }

    fn draw_text(&mut self, position: PixelPoint, text: &str, size: f64, color: Rgb) {
        self.window.draw_text(
            text,
            &Point2::new(position.x as f32, position.y as f32),
            size as f32,
            &self.font,
            &Point3::from(color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_coordinates_are_centered() {
        let vp = Viewport::new(1024.0, 512.0);
        assert_eq!(to_planar(vp.center(), &vp), Point2::new(0.0, 0.0));
        assert_eq!(
            to_planar(PixelPoint::new(0.0, 0.0), &vp),
            Point2::new(-512.0, 256.0)
        );
        assert_eq!(
            to_planar(PixelPoint::new(1024.0, 512.0), &vp),
            Point2::new(512.0, -256.0)
        );
    }
}
