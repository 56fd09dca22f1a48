use legion::*;
use legion::world::SubWorld;
use nalgebra::Vector2;

use crate::{
    bound::{Bound, Link},
    marble::Marble,
    simulation::Gravity,
};

#[system(par_for_each)]
pub fn integrate_marbles(marble: &mut Marble) {
    marble.integrate();
}

#[system(for_each)]
pub fn apply_gravity(marble: &mut Marble, #[resource] gravity: &Gravity) {
    marble.apply_force(Vector2::new(0., gravity.strength));
}

#[system]
#[read_component(Entity)]
#[read_component(Marble)]
#[read_component(Link)]
#[write_component(Bound)]
pub fn sync_links(world: &mut SubWorld) {
    follow_links(world);
}

/// Moves every connecting bound onto the current centers of its two marbles.
/// Links whose marbles are gone are left untouched.
pub fn follow_links<S: EntityStore>(store: &mut S) {
    let centers: fnv::FnvHashMap<Entity, Vector2<f64>> = <(Entity, &Marble)>::query()
        .iter(store)
        .map(|(entity, marble)| (*entity, marble.position))
        .collect();
    for (link, bound) in <(&Link, &mut Bound)>::query().iter_mut(store) {
        if let (Some(p0), Some(p1)) = (centers.get(&link.ends[0]), centers.get(&link.ends[1])) {
            bound.follow(p0, p1);
        }
    }
}
