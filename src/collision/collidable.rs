use crate::{bound::Bound, marble::Marble, vector::distance};
use nalgebra::Vector2;
use std::ops::AddAssign;

/// Share of a marble/marble overlap a marble corrects when it resolves the
/// pair on its own, after the other one already moved.
pub const SEQUENTIAL_SPLIT: f64 = 1.;
/// Share of the overlap each marble corrects when both resolve against the
/// same snapshot.
pub const BATCH_SPLIT: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collidable<'a> {
    Marble(&'a Marble),
    Bound(&'a Bound, Option<&'a Rod>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RodEnd {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
}

impl From<&Marble> for RodEnd {
    fn from(marble: &Marble) -> Self {
        RodEnd {
            position: marble.position,
            velocity: marble.velocity,
        }
    }
}

/// Motion of the two marbles at the ends of a connecting bound.
///
/// Ends are matched by nearness to the bound's start and end. The marbles
/// may have moved since the bound was last synced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rod {
    ends: [RodEnd; 2],
}

impl Rod {
    pub fn new(bound: &Bound, a: RodEnd, b: RodEnd) -> Rod {
        let (start, end) = bound.endpoints();
        let kept = distance(&a.position, &start) + distance(&b.position, &end);
        let swapped = distance(&b.position, &start) + distance(&a.position, &end);
        Rod {
            ends: if kept <= swapped { [a, b] } else { [b, a] },
        }
    }

    pub fn from_marbles(bound: &Bound, a: &Marble, b: &Marble) -> Rod {
        Rod::new(bound, RodEnd::from(a), RodEnd::from(b))
    }

    pub fn ends(&self) -> &[RodEnd; 2] {
        &self.ends
    }

    /// Velocity of the rod at the point of `bound` closest to `point`,
    /// interpolated linearly between the two ends.
    pub fn velocity_at(&self, bound: &Bound, point: &Vector2<f64>) -> Vector2<f64> {
        let t = bound.relative_position(point);
        self.ends[0].velocity * (1. - t) + self.ends[1].velocity * t
    }
}

/// Changes a collision asks of a marble: an immediate position correction
/// and an acceleration taking effect at the next integration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Response {
    pub displacement: Vector2<f64>,
    pub acceleration: Vector2<f64>,
}

impl Response {
    pub fn none() -> Response {
        Response {
            displacement: Vector2::zeros(),
            acceleration: Vector2::zeros(),
        }
    }

    pub fn apply(&self, marble: &mut Marble) {
        marble.position += self.displacement;
        marble.acceleration += self.acceleration;
    }
}

impl AddAssign for Response {
    fn add_assign(&mut self, other: Response) {
        self.displacement += other.displacement;
        self.acceleration += other.acceleration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(x: f64, y: f64, vx: f64, vy: f64) -> RodEnd {
        RodEnd {
            position: Vector2::new(x, y),
            velocity: Vector2::new(vx, vy),
        }
    }

    #[test]
    fn ends_follow_geometry_order() {
        let bound = Bound::new(Vector2::new(10., 0.), Vector2::new(0., 0.));
        let rod = Rod::new(&bound, end(10., 0., 1., 0.), end(0., 0., 0., 0.));
        assert_eq!(rod.ends()[0].position, Vector2::new(0., 0.));

        let vertical = Bound::new(Vector2::new(0., 8.), Vector2::new(0., 2.));
        let rod = Rod::new(&vertical, end(0., 8., 0., 0.), end(0., 2., 0., 0.));
        assert_eq!(rod.ends()[0].position, Vector2::new(0., 2.));
    }

    #[test]
    fn ends_match_bound_after_marbles_move() {
        // Synced while both ends shared x = 100; the top end then slid right.
        let bound = Bound::new(Vector2::new(100., 200.), Vector2::new(100., 400.));
        let top = end(100.5, 200., 1., 0.);
        let bottom = end(100., 400., 0., 0.);
        let rod = Rod::new(&bound, bottom, top);
        assert_eq!(rod.ends()[0], top);
        assert_eq!(rod.velocity_at(&bound, &Vector2::new(108., 220.)), Vector2::new(0.9, 0.));
    }

    #[test]
    fn velocity_interpolates_along_rod() {
        let a = end(0., 0., 0., 2.);
        let b = end(10., 0., 4., 0.);
        let bound = Bound::new(a.position, b.position);
        let rod = Rod::new(&bound, b, a);

        assert_eq!(rod.velocity_at(&bound, &Vector2::new(0., 3.)), a.velocity);
        assert_eq!(rod.velocity_at(&bound, &Vector2::new(10., -3.)), b.velocity);
        assert_eq!(
            rod.velocity_at(&bound, &Vector2::new(5., 1.)),
            Vector2::new(2., 1.)
        );
    }

    #[test]
    fn responses_accumulate() {
        let mut total = Response::none();
        total += Response {
            displacement: Vector2::new(1., 0.),
            acceleration: Vector2::new(0., 2.),
        };
        total += Response {
            displacement: Vector2::new(1., 1.),
            acceleration: Vector2::new(3., 0.),
        };
        let mut marble = Marble::new(Vector2::zeros(), 1.);
        total.apply(&mut marble);
        assert_eq!(marble.position, Vector2::new(2., 1.));
        assert_eq!(marble.acceleration, Vector2::new(3., 2.));
    }
}
