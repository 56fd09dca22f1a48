use crate::{
    bound::Bound,
    marble::{Marble, DEFAULT_RADIUS},
    simulation::{Simulation, SimulationConfig},
};
use legion::{Entity, World};
use log::warn;
use nalgebra::{Vector2, Vector3};
use rand::Rng;
use rand_pcg::Pcg64;

pub struct GenerationConfig {
    pub marbles: usize,
    pub min_radius: f64,
    pub max_radius: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            marbles: 1,
            min_radius: 25.,
            max_radius: 75.,
        }
    }
}

pub fn seeded_rng() -> Pcg64 {
    Pcg64::new(0xcafef00dd15ea5e5, 0xa02bdbf7bb3c0a7ac28fa16a64abf96)
}

/// Encloses the world: floor, left wall, ceiling, right wall.
pub fn init_walls(world: &mut World, config: &SimulationConfig) -> Vec<Entity> {
    let points = [
        Vector2::new(0., 0.),
        Vector2::new(config.width, 0.),
        Vector2::new(config.width, config.height),
        Vector2::new(0., config.height),
    ];
    let wall = |p0: Vector2<f64>, p1: Vector2<f64>| {
        (Bound::new(p0, p1)
            .with_elasticity(config.wall_elasticity)
            .with_friction(config.wall_friction),)
    };
    let walls = vec![
        wall(points[3], points[2]),
        wall(points[0], points[3]),
        wall(points[0], points[1]),
        wall(points[1], points[2]),
    ];
    world.extend(walls).to_vec()
}

pub fn random_color<R: Rng>(rng: &mut R) -> Vector3<f32> {
    let mut channel = || rng.gen_range(0..=255u8) as f32 / 255.;
    Vector3::new(channel(), channel(), channel())
}

pub fn random_radius<R: Rng>(rng: &mut R, config: &GenerationConfig) -> f64 {
    if config.max_radius > config.min_radius {
        rng.gen_range(config.min_radius..=config.max_radius).round()
    } else {
        config.min_radius
    }
}

/// Seeds the world with marbles. The first one sits in the middle of the
/// world; the rest are scattered without overlapping anything.
pub fn init_marbles<R: Rng>(
    sim: &mut Simulation,
    config: &GenerationConfig,
    rng: &mut R,
) -> Vec<Entity> {
    let (width, height) = (sim.config().width, sim.config().height);
    let mut placed = Vec::with_capacity(config.marbles);
    if config.marbles == 0 {
        return placed;
    }
    let center = Marble::new(Vector2::new(width / 2., height / 2.), DEFAULT_RADIUS)
        .with_color(random_color(rng));
    placed.push(sim.spawn_marble(center));

    let mut attempts = 0;
    while placed.len() < config.marbles {
        attempts += 1;
        if attempts > 1000 * config.marbles {
            warn!("Placed only {} of {} marbles", placed.len(), config.marbles);
            break;
        }
        let radius = random_radius(rng, config);
        if 2. * radius >= width || 2. * radius >= height {
            continue;
        }
        let marble = Marble::new(
            Vector2::new(
                rng.gen_range(radius..(width - radius)),
                rng.gen_range(radius..(height - radius)),
            ),
            radius,
        )
        .with_color(random_color(rng));

        // Check it doesn't overlap with an existing marble.
        let overlaps = sim.marbles().iter().any(|(_, other)| {
            (other.position - marble.position).norm() <= other.radius + marble.radius
        });
        if overlaps {
            continue;
        }
        placed.push(sim.spawn_marble(marble));
    }
    placed
}
