use super::collidable::Collidable;
use crate::{bound::Bound, marble::Marble, vector::distance};
use nalgebra::Vector2;

/// Relative tolerance for treating a marble pair as exactly touching.
const TOUCH_TOLERANCE: f64 = 1e-9;

/// Where a marble touches something, seen from the marble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Closest point of the bound, or the other marble's center.
    pub anchor: Vector2<f64>,
    /// From `anchor` to the marble's center.
    pub offset: Vector2<f64>,
    pub distance: f64,
    /// Distance at which the two just touch.
    pub reach: f64,
}

impl Contact {
    pub fn overlap(&self) -> f64 {
        (self.reach - self.distance).max(0.)
    }
}

pub fn solve_collision(marble: &Marble, collidable: &Collidable) -> Option<Contact> {
    match collidable {
        Collidable::Marble(other) => solve_collision_marble_marble(marble, other),
        Collidable::Bound(bound, _) => solve_collision_marble_bound(marble, bound),
    }
}

fn solve_collision_marble_marble(marble: &Marble, other: &Marble) -> Option<Contact> {
    let d = distance(&marble.position, &other.position);
    let reach = marble.radius + other.radius;
    // Coincident centers have no collision normal and are left alone.
    if is_close(reach, d) || (d <= reach && d > 0.) {
        return Some(Contact {
            anchor: other.position,
            offset: marble.position - other.position,
            distance: d,
            reach,
        });
    }
    None
}

fn solve_collision_marble_bound(marble: &Marble, bound: &Bound) -> Option<Contact> {
    let closest = bound.closest_point(&marble.position);
    let d = distance(&marble.position, &closest);
    if d <= marble.radius {
        return Some(Contact {
            anchor: closest,
            offset: marble.position - closest,
            distance: d,
            reach: marble.radius,
        });
    }
    None
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOUCH_TOLERANCE * a.abs().max(b.abs())
}
