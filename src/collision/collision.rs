use super::{
    collidable::{Collidable, Response, Rod, BATCH_SPLIT},
    colliders::collide,
};
use crate::{
    bound::{Bound, Link},
    marble::Marble,
};
use fnv::FnvHashMap;
use legion::IntoQuery;
use legion::{system, world::SubWorld, Entity};
use log::debug;
use rayon::prelude::*;

/// Contacts found during the last frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub marble_contacts: usize,
    pub bound_contacts: usize,
}

struct Obstacle {
    bound: Bound,
    link: Option<Link>,
    rod: Option<Rod>,
}

impl Obstacle {
    fn collidable(&self) -> Collidable {
        Collidable::Bound(&self.bound, self.rod.as_ref())
    }

    fn is_attached_to(&self, entity: Entity) -> bool {
        self.link.map_or(false, |link| link.contains(entity))
    }
}

fn snapshot_marbles(world: &SubWorld) -> Vec<(Entity, Marble)> {
    <(Entity, &Marble)>::query()
        .iter(world)
        .map(|(entity, marble)| (*entity, *marble))
        .collect()
}

/// Writes responses back in one pass, after every response was computed from
/// the same snapshot.
fn apply_responses(world: &mut SubWorld, responses: Vec<(Entity, Response, usize)>) -> usize {
    let contacts = responses.iter().map(|(_, _, count)| count).sum();
    let responses: FnvHashMap<Entity, Response> = responses
        .into_iter()
        .map(|(entity, response, _)| (entity, response))
        .collect();
    for (entity, marble) in <(Entity, &mut Marble)>::query().iter_mut(world) {
        if let Some(response) = responses.get(entity) {
            response.apply(marble);
        }
    }
    contacts
}

#[system]
#[read_component(Entity)]
#[write_component(Marble)]
pub fn collide_marbles(world: &mut SubWorld, #[resource] stats: &mut CollisionStats) {
    let marbles = snapshot_marbles(world);
    let responses: Vec<(Entity, Response, usize)> = marbles
        .par_iter()
        .filter_map(|(entity, marble)| {
            let mut total = Response::none();
            let mut count = 0;
            for (other_entity, other) in &marbles {
                if other_entity == entity {
                    continue;
                }
                if let Some(response) = collide(marble, &Collidable::Marble(other), BATCH_SPLIT) {
                    total += response;
                    count += 1;
                }
            }
            if count > 0 {
                Some((*entity, total, count))
            } else {
                None
            }
        })
        .collect();
    stats.marble_contacts = apply_responses(world, responses);
    if stats.marble_contacts > 0 {
        debug!("{} marble contacts", stats.marble_contacts);
    }
}

#[system]
#[read_component(Entity)]
#[write_component(Marble)]
#[read_component(Bound)]
#[read_component(Link)]
pub fn collide_bounds(world: &mut SubWorld, #[resource] stats: &mut CollisionStats) {
    let marbles = snapshot_marbles(world);
    let by_entity: FnvHashMap<Entity, Marble> = marbles.iter().cloned().collect();
    let links: FnvHashMap<Entity, Link> = <(Entity, &Link)>::query()
        .iter(world)
        .map(|(entity, link)| (*entity, *link))
        .collect();
    let obstacles: Vec<Obstacle> = <(Entity, &Bound)>::query()
        .iter(world)
        .map(|(entity, bound)| {
            let link = links.get(entity).copied();
            let rod = link.and_then(|link| {
                match (by_entity.get(&link.ends[0]), by_entity.get(&link.ends[1])) {
                    (Some(a), Some(b)) => Some(Rod::from_marbles(bound, a, b)),
                    _ => None,
                }
            });
            Obstacle {
                bound: *bound,
                link,
                rod,
            }
        })
        .collect();

    let responses: Vec<(Entity, Response, usize)> = marbles
        .par_iter()
        .filter_map(|(entity, marble)| {
            let mut total = Response::none();
            let mut count = 0;
            for obstacle in &obstacles {
                // A rod never hits the marbles holding it.
                if obstacle.is_attached_to(*entity) {
                    continue;
                }
                if let Some(response) = collide(marble, &obstacle.collidable(), BATCH_SPLIT) {
                    total += response;
                    count += 1;
                }
            }
            if count > 0 {
                Some((*entity, total, count))
            } else {
                None
            }
        })
        .collect();
    stats.bound_contacts = apply_responses(world, responses);
}
