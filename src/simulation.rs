use fnv::FnvHashSet;
use legion::systems::CommandBuffer;
use legion::world::SubWorld;
use legion::*;
use log::{debug, info, warn};
use nalgebra::Vector2;

use crate::{
    advance::{apply_gravity_system, follow_links, integrate_marbles_system, sync_links_system},
    bound::{Bound, Link},
    collision::{collide_bounds_system, collide_marbles_system, CollisionStats},
    marble::{Connection, Marble},
    render::{draw, Canvas},
    world_gen::init_walls,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    pub width: f64,
    pub height: f64,
    /// Strength gravity returns to when toggled back on.
    pub gravity: f64,
    pub wall_elasticity: f64,
    pub wall_friction: f64,
    /// Whether to enclose the world with four static bounds.
    pub walls: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            width: 1280.,
            height: 640.,
            gravity: 0.01,
            wall_elasticity: crate::bound::DEFAULT_ELASTICITY,
            wall_friction: crate::bound::DEFAULT_FRICTION,
            walls: true,
        }
    }
}

impl SimulationConfig {
    pub fn contains(&self, point: &Vector2<f64>) -> bool {
        point.x >= 0. && point.x <= self.width && point.y >= 0. && point.y <= self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    pub strength: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameClock {
    pub frame: u64,
}

/// Entities to drop when some marbles leave the world.
#[derive(Debug, Default, PartialEq)]
pub struct RemovalPlan {
    pub marbles: Vec<Entity>,
    /// Connecting bounds that lose one of their marbles.
    pub bounds: Vec<Entity>,
    /// Surviving marbles whose connection goes away.
    pub orphans: Vec<Entity>,
}

impl RemovalPlan {
    pub fn build<S: EntityStore>(store: &S, doomed: &FnvHashSet<Entity>) -> RemovalPlan {
        let bounds: FnvHashSet<Entity> = <(Entity, &Link)>::query()
            .iter(store)
            .filter(|(_, link)| link.ends.iter().any(|end| doomed.contains(end)))
            .map(|(entity, _)| *entity)
            .collect();
        let orphans = <(Entity, &Connection)>::query()
            .iter(store)
            .filter(|(entity, connection)| {
                !doomed.contains(*entity)
                    && (doomed.contains(&connection.partner) || bounds.contains(&connection.bound))
            })
            .map(|(entity, _)| *entity)
            .collect();
        RemovalPlan {
            marbles: doomed.iter().copied().collect(),
            bounds: bounds.into_iter().collect(),
            orphans,
        }
    }

    fn apply(self, world: &mut World) {
        for entity in self.marbles.iter().chain(self.bounds.iter()) {
            world.remove(*entity);
        }
        for entity in self.orphans {
            if let Some(mut entry) = world.entry(entity) {
                entry.remove_component::<Connection>();
            }
        }
    }

    fn queue(self, commands: &mut CommandBuffer) {
        for entity in self.marbles.into_iter().chain(self.bounds.into_iter()) {
            commands.remove(entity);
        }
        for entity in self.orphans {
            commands.remove_component::<Connection>(entity);
        }
    }
}

#[system]
#[read_component(Entity)]
#[read_component(Marble)]
#[read_component(Link)]
#[read_component(Connection)]
pub fn cull_marbles(
    world: &mut SubWorld,
    commands: &mut CommandBuffer,
    #[resource] config: &SimulationConfig,
) {
    let doomed: FnvHashSet<Entity> = <(Entity, &Marble)>::query()
        .iter(world)
        .filter(|(_, marble)| !config.contains(&marble.position))
        .map(|(entity, _)| *entity)
        .collect();
    if doomed.is_empty() {
        return;
    }
    let plan = RemovalPlan::build(world, &doomed);
    debug!(
        "Culling {} marbles and {} bounds",
        plan.marbles.len(),
        plan.bounds.len()
    );
    plan.queue(commands);
}

#[system]
pub fn advance_clock(#[resource] clock: &mut FrameClock, #[resource] stats: &CollisionStats) {
    clock.frame += 1;
    debug!(
        "Frame {}: {} marble contacts, {} bound contacts",
        clock.frame, stats.marble_contacts, stats.bound_contacts
    );
}

/// Builds the per-frame schedule. Culling is flushed before gravity so no
/// later system sees a removed marble.
pub fn build_schedule() -> Schedule {
    Schedule::builder()
        .add_system(integrate_marbles_system())
        .add_system(sync_links_system())
        .add_system(cull_marbles_system())
        .flush()
        .add_system(apply_gravity_system())
        .add_system(collide_marbles_system())
        .add_system(collide_bounds_system())
        .add_system(advance_clock_system())
        .build()
}

pub fn init_simulation(resources: &mut Resources, config: SimulationConfig) {
    resources.insert(Gravity {
        strength: config.gravity,
    });
    resources.insert(FrameClock::default());
    resources.insert(CollisionStats::default());
    resources.insert(config);
}

/// All marbles and bounds of one world, with the schedule that steps them.
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    resources: Resources,
    schedule: Schedule,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Simulation {
        let mut world = World::default();
        if config.walls {
            init_walls(&mut world, &config);
        }
        let mut resources = Resources::default();
        init_simulation(&mut resources, config);
        info!(
            "Simulation {}x{} with gravity {}",
            config.width, config.height, config.gravity
        );
        Simulation {
            config,
            world,
            resources,
            schedule: build_schedule(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances every marble and bound by one frame.
    pub fn step(&mut self) {
        self.schedule.execute(&mut self.world, &mut self.resources);
    }

    pub fn frame(&self) -> u64 {
        self.resources
            .get::<FrameClock>()
            .map_or(0, |clock| clock.frame)
    }

    pub fn collision_stats(&self) -> CollisionStats {
        self.resources
            .get::<CollisionStats>()
            .map_or_else(CollisionStats::default, |stats| *stats)
    }

    pub fn gravity(&self) -> f64 {
        self.resources
            .get::<Gravity>()
            .map_or(0., |gravity| gravity.strength)
    }

    pub fn set_gravity(&mut self, strength: f64) {
        self.resources.insert(Gravity { strength });
    }

    /// Switches gravity off, or back on at the configured strength.
    pub fn toggle_gravity(&mut self) {
        let strength = if self.gravity() == 0. {
            self.config.gravity
        } else {
            0.
        };
        info!("Gravity set to {}", strength);
        self.set_gravity(strength);
    }

    pub fn spawn_marble(&mut self, marble: Marble) -> Entity {
        self.world.push((marble,))
    }

    pub fn add_bound(&mut self, bound: Bound) -> Entity {
        self.world.push((bound,))
    }

    pub fn marble(&self, entity: Entity) -> Option<Marble> {
        let entry = self.world.entry_ref(entity).ok()?;
        let marble = entry.get_component::<Marble>().ok().copied();
        marble
    }

    pub fn bound(&self, entity: Entity) -> Option<Bound> {
        let entry = self.world.entry_ref(entity).ok()?;
        let bound = entry.get_component::<Bound>().ok().copied();
        bound
    }

    pub fn connection(&self, entity: Entity) -> Option<Connection> {
        let entry = self.world.entry_ref(entity).ok()?;
        let connection = entry.get_component::<Connection>().ok().copied();
        connection
    }

    pub fn link(&self, entity: Entity) -> Option<Link> {
        let entry = self.world.entry_ref(entity).ok()?;
        let link = entry.get_component::<Link>().ok().copied();
        link
    }

    pub fn marbles(&self) -> Vec<(Entity, Marble)> {
        <(Entity, &Marble)>::query()
            .iter(&self.world)
            .map(|(entity, marble)| (*entity, *marble))
            .collect()
    }

    pub fn bounds(&self) -> Vec<(Entity, Bound)> {
        <(Entity, &Bound)>::query()
            .iter(&self.world)
            .map(|(entity, bound)| (*entity, *bound))
            .collect()
    }

    pub fn marble_count(&self) -> usize {
        <&Marble>::query().iter(&self.world).count()
    }

    pub fn bound_count(&self) -> usize {
        <&Bound>::query().iter(&self.world).count()
    }

    /// First marble covering `point`.
    pub fn marble_at(&self, point: &Vector2<f64>) -> Option<Entity> {
        <(Entity, &Marble)>::query()
            .iter(&self.world)
            .find(|(_, marble)| marble.contains(point))
            .map(|(entity, _)| *entity)
    }

    pub fn apply_force(&mut self, entity: Entity, force: Vector2<f64>) -> bool {
        match self.world.entry(entity) {
            Some(mut entry) => match entry.get_component_mut::<Marble>() {
                Ok(marble) => {
                    marble.apply_force(force);
                    true
                }
                Err(_) => false,
            },
            None => false,
        }
    }

    /// Applies the same force to every marble.
    pub fn push_all(&mut self, force: Vector2<f64>) {
        for marble in <&mut Marble>::query().iter_mut(&mut self.world) {
            marble.apply_force(force);
        }
    }

    /// Links two marbles with a rod owned by `entity`. A marble owns at most
    /// one rod, so an earlier rod of `entity` is removed first. It may still
    /// sit at the far end of rods owned by other marbles, but never twice
    /// with the same pair.
    pub fn connect(&mut self, entity: Entity, partner: Entity) -> Option<Entity> {
        if entity == partner {
            warn!("Refusing to connect {:?} to itself", entity);
            return None;
        }
        if self.connection(partner).map_or(false, |c| c.partner == entity) {
            warn!("{:?} and {:?} are already connected", partner, entity);
            return None;
        }
        let (marble, other) = match (self.marble(entity), self.marble(partner)) {
            (Some(marble), Some(other)) => (marble, other),
            _ => {
                warn!("Cannot connect {:?} and {:?}", entity, partner);
                return None;
            }
        };
        self.disconnect(entity);
        let bound = self.world.push((
            marble.connect(&other),
            Link {
                ends: [entity, partner],
            },
        ));
        if let Some(mut entry) = self.world.entry(entity) {
            entry.add_component(Connection { partner, bound });
        }
        debug!("Connected {:?} to {:?} with {:?}", entity, partner, bound);
        Some(bound)
    }

    /// Removes the rod `entity` created. Returns whether there was one.
    pub fn disconnect(&mut self, entity: Entity) -> bool {
        let connection = match self.connection(entity) {
            Some(connection) => connection,
            None => return false,
        };
        self.world.remove(connection.bound);
        if let Some(mut entry) = self.world.entry(entity) {
            entry.remove_component::<Connection>();
        }
        true
    }

    /// Removes a marble along with every rod attached to it.
    pub fn remove_marble(&mut self, entity: Entity) -> bool {
        if self.marble(entity).is_none() {
            return false;
        }
        let mut doomed = FnvHashSet::default();
        doomed.insert(entity);
        RemovalPlan::build(&self.world, &doomed).apply(&mut self.world);
        true
    }

    /// Moves connecting bounds onto their marbles without stepping.
    pub fn sync_connections(&mut self) {
        follow_links(&mut self.world);
    }

    pub fn draw<C: Canvas>(&self, canvas: &mut C) {
        draw(&self.world, canvas);
    }
}
