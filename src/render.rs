use crate::{bound::Bound, marble::Marble};
use legion::{EntityStore, IntoQuery};
use nalgebra::{Vector2, Vector3};

pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub background: Vector3<f32>,
    /// Stroke width for bounds, in pixels.
    pub bound_width: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 1280,
            height: 640,
            background: Vector3::new(1., 1., 1.),
            bound_width: 5,
        }
    }
}

/// Anything that can draw the world's two shapes.
pub trait Canvas {
    fn circle(&mut self, center: &Vector2<f64>, radius: f64, color: &Vector3<f32>);
    fn segment(&mut self, start: &Vector2<f64>, end: &Vector2<f64>);
}

/// Draws marbles first, then bounds on top of them.
pub fn draw<S: EntityStore, C: Canvas>(store: &S, canvas: &mut C) {
    for marble in <&Marble>::query().iter(store) {
        canvas.circle(&marble.position, marble.radius, &marble.color);
    }
    for bound in <&Bound>::query().iter(store) {
        let (start, end) = bound.endpoints();
        canvas.segment(&start, &end);
    }
}

/// Color with components in [0, 1] as 8-bit channels.
pub fn to_rgb(color: &Vector3<f32>) -> (u8, u8, u8) {
    let channel = |c: f32| (c.max(0.).min(1.) * 255.).round() as u8;
    (channel(color.x), channel(color.y), channel(color.z))
}
