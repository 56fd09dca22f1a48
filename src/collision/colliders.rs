use super::{
    collidable::{Collidable, Response, Rod},
    solvers::{solve_collision, Contact},
};
use crate::{
    bound::Bound,
    marble::Marble,
    vector::{unit, EPSILON},
};
use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, PI};

/// Response of `marble` to touching `collidable`, or `None` when they are
/// apart. `split` is the share of a marble/marble overlap this marble
/// corrects; bound overlaps are always corrected in full.
pub fn collide(marble: &Marble, collidable: &Collidable, split: f64) -> Option<Response> {
    let contact = solve_collision(marble, collidable)?;
    Some(match collidable {
        Collidable::Marble(other) => collide_marble_marble(marble, other, &contact, split),
        Collidable::Bound(bound, rod) => collide_marble_bound(marble, bound, *rod, &contact),
    })
}

/// Angle of the collision normal, measured from the positive x axis.
pub fn normal_angle(offset: &Vector2<f64>) -> f64 {
    offset.y.atan2(offset.x)
}

fn collide_marble_marble(
    marble: &Marble,
    other: &Marble,
    contact: &Contact,
    split: f64,
) -> Response {
    let phi = normal_angle(&contact.offset);
    let normal = unit(phi);
    let tangent = unit(phi + FRAC_PI_2);

    // Take the other marble's motion along the normal, keep our own across it.
    let new_velocity =
        normal * other.velocity.dot(&normal) + tangent * marble.velocity.dot(&tangent);
    Response {
        displacement: normal * contact.overlap() * split,
        acceleration: (new_velocity - marble.velocity) * marble.elasticity,
    }
}

fn collide_marble_bound(
    marble: &Marble,
    bound: &Bound,
    rod: Option<&Rod>,
    contact: &Contact,
) -> Response {
    let phi = if contact.distance < EPSILON {
        // Center sits on the bound: leave on the side the marble came from.
        let across = bound.angle() + FRAC_PI_2;
        if unit(across).dot(&marble.velocity) > 0. {
            across - PI
        } else {
            across
        }
    } else {
        normal_angle(&contact.offset)
    };
    let normal = unit(phi);
    let tangent = unit(phi + FRAC_PI_2);

    let frame = match rod {
        Some(rod) => rod.velocity_at(bound, &marble.position),
        None => Vector2::zeros(),
    };
    let relative = marble.velocity - frame;
    // Normal part always ends up pointing away from the bound.
    let reflected = normal * relative.dot(&normal).abs() + tangent * relative.dot(&tangent);
    let new_velocity = frame + reflected;

    Response {
        displacement: normal * contact.overlap(),
        acceleration: (new_velocity - marble.velocity) * bound.elasticity,
    }
}

#[cfg(test)]
mod tests {
    use super::super::collidable::{BATCH_SPLIT, SEQUENTIAL_SPLIT};
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn close(a: &Vector2<f64>, b: &Vector2<f64>) -> bool {
        (a - b).norm() < TOLERANCE
    }

    fn floor() -> Bound {
        Bound::new(Vector2::new(0., 640.), Vector2::new(1280., 640.)).with_elasticity(1.)
    }

    fn kinetic_energy(marbles: &[&Marble]) -> f64 {
        marbles
            .iter()
            .map(|m| 0.5 * m.velocity.norm_squared())
            .sum()
    }

    #[test]
    fn normal_angle_covers_all_quadrants() {
        assert_eq!(normal_angle(&Vector2::new(1., 0.)), 0.);
        assert_eq!(normal_angle(&Vector2::new(0., 3.)), FRAC_PI_2);
        assert_eq!(normal_angle(&Vector2::new(-2., 0.)), PI);
        assert_eq!(normal_angle(&Vector2::new(0., -3.)), -FRAC_PI_2);
        assert!((normal_angle(&Vector2::new(-1., -1.)) + 3. * PI / 4.).abs() < TOLERANCE);
    }

    #[test]
    fn head_on_static_bound_negates_normal_velocity() {
        let mut marble =
            Marble::new(Vector2::new(300., 595.), 50.).with_velocity(Vector2::new(0., 2.));
        let response = collide(&marble, &Collidable::Bound(&floor(), None), SEQUENTIAL_SPLIT)
            .unwrap();
        assert!(close(&response.displacement, &Vector2::new(0., -5.)));

        response.apply(&mut marble);
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(0., -2.)));
        assert!((marble.position.y - 588.).abs() < TOLERANCE);
    }

    #[test]
    fn bouncing_twice_keeps_speed() {
        let ceiling = Bound::new(Vector2::new(0., 0.), Vector2::new(1280., 0.)).with_elasticity(1.);
        let mut down =
            Marble::new(Vector2::new(300., 590.), 50.).with_velocity(Vector2::new(0., 3.));
        assert!(down.collide_with_bound(&floor(), None));
        down.integrate();

        let mut up = down;
        up.position = Vector2::new(300., 50.);
        assert!(up.collide_with_bound(&ceiling, None));
        up.integrate();
        assert!(close(&up.velocity, &Vector2::new(0., 3.)));
        assert!((up.total_speed() - 3.).abs() < TOLERANCE);
    }

    #[test]
    fn oblique_bounce_keeps_tangential_velocity() {
        let mut marble =
            Marble::new(Vector2::new(300., 590.), 50.).with_velocity(Vector2::new(1.5, 2.));
        marble.collide_with_bound(&floor(), None);
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(1.5, -2.)));
    }

    #[test]
    fn elasticity_scales_the_impulse() {
        let bound = floor().with_elasticity(0.7);
        let mut marble =
            Marble::new(Vector2::new(300., 590.), 50.).with_velocity(Vector2::new(0., 2.));
        marble.collide_with_bound(&bound, None);
        assert!(close(&marble.acceleration, &Vector2::new(0., -2.8)));
    }

    #[test]
    fn leaving_marble_is_not_pulled_back() {
        let mut marble =
            Marble::new(Vector2::new(300., 600.), 50.).with_velocity(Vector2::new(1., -2.));
        assert!(marble.collide_with_bound(&floor(), None));
        assert!(close(&marble.acceleration, &Vector2::zeros()));
        assert!(close(&marble.position, &Vector2::new(300., 590.)));
    }

    #[test]
    fn sloped_bound_reflects_about_its_normal() {
        // 45 degree ramp, marble falling straight down onto it.
        let ramp = Bound::new(Vector2::new(0., 0.), Vector2::new(100., 100.)).with_elasticity(1.);
        let center = Vector2::new(50. - 10. / 2f64.sqrt(), 50. + 10. / 2f64.sqrt());
        let mut marble = Marble::new(center, 10.5).with_velocity(Vector2::new(0., -1.));
        assert!(marble.collide_with_bound(&ramp, None));
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(-1., 0.)));
    }

    #[test]
    fn centered_on_bound_is_pushed_back() {
        let mut marble =
            Marble::new(Vector2::new(300., 640.), 50.).with_velocity(Vector2::new(0., 1.));
        assert!(marble.collide_with_bound(&floor(), None));
        assert!(close(&marble.position, &Vector2::new(300., 590.)));
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(0., -1.)));
    }

    #[test]
    fn moving_rod_reflects_in_its_own_frame() {
        let left = Marble::new(Vector2::new(0., 640.), 5.).with_velocity(Vector2::new(0., -1.));
        let right = Marble::new(Vector2::new(200., 640.), 5.).with_velocity(Vector2::new(0., -1.));
        let bound = left.connect(&right).with_elasticity(1.);
        let rod = Rod::from_marbles(&bound, &left, &right);

        // Resting marble above a rod rising at speed 1 is kicked up to speed 2.
        let mut marble = Marble::new(Vector2::new(100., 600.), 50.);
        assert!(marble.collide_with_bound(&bound, Some(&rod)));
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(0., -2.)));
    }

    #[test]
    fn rod_velocity_is_interpolated_at_contact() {
        let left = Marble::new(Vector2::new(0., 640.), 5.);
        let right = Marble::new(Vector2::new(200., 640.), 5.).with_velocity(Vector2::new(0., -2.));
        let bound = right.connect(&left).with_elasticity(1.);
        let rod = Rod::from_marbles(&bound, &right, &left);

        // A quarter of the way from the still end the rod moves at 0.5.
        let mut marble = Marble::new(Vector2::new(50., 590.), 50.);
        marble.collide_with_bound(&bound, Some(&rod));
        marble.integrate();
        assert!(close(&marble.velocity, &Vector2::new(0., -1.)));
    }

    #[test]
    fn head_on_marbles_exchange_velocity() {
        let a = Marble::new(Vector2::new(0., 0.), 50.)
            .with_velocity(Vector2::new(3., 0.))
            .with_elasticity(1.);
        let b = Marble::new(Vector2::new(96., 0.), 50.)
            .with_velocity(Vector2::new(-3., 0.))
            .with_elasticity(1.);
        let ra = collide(&a, &Collidable::Marble(&b), BATCH_SPLIT).unwrap();
        let rb = collide(&b, &Collidable::Marble(&a), BATCH_SPLIT).unwrap();
        let before = kinetic_energy(&[&a, &b]);

        let (mut a, mut b) = (a, b);
        ra.apply(&mut a);
        rb.apply(&mut b);
        assert!(((b.position - a.position).norm() - 100.).abs() < TOLERANCE);

        a.integrate();
        b.integrate();
        assert!(close(&a.velocity, &Vector2::new(-3., 0.)));
        assert!(close(&b.velocity, &Vector2::new(3., 0.)));
        assert!((kinetic_energy(&[&a, &b]) - before).abs() < TOLERANCE);
    }

    #[test]
    fn oblique_marbles_conserve_energy() {
        let a = Marble::new(Vector2::new(0., 0.), 50.)
            .with_velocity(Vector2::new(1., 1.))
            .with_elasticity(1.);
        let b = Marble::new(Vector2::new(100., 0.), 50.)
            .with_velocity(Vector2::new(-1., 0.5))
            .with_elasticity(1.);
        let before = kinetic_energy(&[&a, &b]);
        let ra = collide(&a, &Collidable::Marble(&b), BATCH_SPLIT).unwrap();
        let rb = collide(&b, &Collidable::Marble(&a), BATCH_SPLIT).unwrap();
        let (mut a, mut b) = (a, b);
        ra.apply(&mut a);
        rb.apply(&mut b);
        a.integrate();
        b.integrate();
        assert!(close(&a.velocity, &Vector2::new(-1., 1.)));
        assert!(close(&b.velocity, &Vector2::new(1., 0.5)));
        assert!((kinetic_energy(&[&a, &b]) - before).abs() < TOLERANCE);
    }

    #[test]
    fn sequential_resolution_separates_in_one_pass() {
        let mut a = Marble::new(Vector2::new(0., 0.), 50.);
        let b = Marble::new(Vector2::new(30., 40.), 50.);
        assert!(a.collide_with_marble(&b));
        assert!(close(&a.position, &Vector2::new(-30., -40.)));
        assert!(((b.position - a.position).norm() - 100.).abs() < TOLERANCE);
    }
}
