use crate::bound::Bound;
use crate::collision::collidable::{Collidable, Rod, SEQUENTIAL_SPLIT};
use crate::collision::colliders::collide;
use crate::vector::{distance, magnitude};
use legion::Entity;
use nalgebra::{Vector2, Vector3};

pub const DEFAULT_RADIUS: f64 = 50.;
pub const DEFAULT_ELASTICITY: f64 = 0.7;
pub const MIN_RADIUS: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marble {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    /// Accumulated since the last integration, consumed by the next one.
    pub acceleration: Vector2<f64>,
    pub radius: f64,
    pub color: Vector3<f32>,
    pub elasticity: f64,
}

/// A marble's rod to its partner. The rod itself is a bound entity with a
/// [`crate::bound::Link`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub partner: Entity,
    pub bound: Entity,
}

impl Default for Marble {
    fn default() -> Self {
        Marble::new(Vector2::new(640., 320.), DEFAULT_RADIUS)
    }
}

impl Marble {
    pub fn new(position: Vector2<f64>, radius: f64) -> Marble {
        Marble {
            position,
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            radius: radius.max(MIN_RADIUS),
            color: Vector3::zeros(),
            elasticity: DEFAULT_ELASTICITY,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector2<f64>) -> Marble {
        self.velocity = velocity;
        self
    }

    pub fn with_color(mut self, color: Vector3<f32>) -> Marble {
        self.color = color;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f64) -> Marble {
        self.elasticity = elasticity;
        self
    }

    /// Queues a velocity change for the next integration.
    pub fn apply_force(&mut self, force: Vector2<f64>) {
        self.acceleration += force;
    }

    pub fn integrate(&mut self) {
        self.velocity += self.acceleration;
        self.acceleration = Vector2::zeros();
        self.position += self.velocity;
    }

    pub fn total_speed(&self) -> f64 {
        magnitude(&[self.velocity.x, self.velocity.y])
    }

    pub fn travel_angle(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }

    pub fn contains(&self, point: &Vector2<f64>) -> bool {
        distance(&self.position, point) <= self.radius
    }

    /// Resolves a collision against `other` immediately, moving this marble
    /// out of any overlap. Returns whether the two were touching.
    pub fn collide_with_marble(&mut self, other: &Marble) -> bool {
        self.resolve(&Collidable::Marble(other))
    }

    /// Resolves a collision against a bound immediately. `rod` carries the
    /// motion of the linked marbles when the bound connects two of them.
    pub fn collide_with_bound(&mut self, bound: &Bound, rod: Option<&Rod>) -> bool {
        self.resolve(&Collidable::Bound(bound, rod))
    }

    fn resolve(&mut self, collidable: &Collidable) -> bool {
        match collide(self, collidable, SEQUENTIAL_SPLIT) {
            Some(response) => {
                response.apply(self);
                true
            }
            None => false,
        }
    }

    /// Bound spanning from this marble to `other`.
    pub fn connect(&self, other: &Marble) -> Bound {
        Bound::new(self.position, other.position)
    }
}
