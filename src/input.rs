//! Turns clicks and key presses into world changes.
//!
//! Clicking a marble selects it; clicking it again deletes it, and clicking a
//! different marble connects the selected one to it. With shift held, two
//! clicks on empty space lay down a static bound between them. Any other click
//! on empty space drops a new marble there.

use crate::{
    bound::Bound,
    marble::Marble,
    simulation::Simulation,
    world_gen::{random_color, random_radius, seeded_rng, GenerationConfig},
};
use legion::Entity;
use log::debug;
use nalgebra::Vector2;
use rand_pcg::Pcg64;

/// Velocity change of one arrow key press.
pub const IMPULSE: f64 = 1.;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    /// Toggles gravity.
    Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarbleSize {
    Small,
    Medium,
    Large,
}

impl MarbleSize {
    pub fn radius(self) -> f64 {
        match self {
            MarbleSize::Small => 25.,
            MarbleSize::Medium => 50.,
            MarbleSize::Large => 75.,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Size key held while clicking, if any.
    pub size: Option<MarbleSize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Selected(Entity),
    Removed(Entity),
    Connected { bound: Entity },
    PointStored,
    BoundCreated(Entity),
    MarbleCreated(Entity),
    /// The click referred to something that no longer exists.
    Ignored,
}

pub struct Interaction {
    selected_marble: Option<Entity>,
    selected_point: Option<Vector2<f64>>,
    generation: GenerationConfig,
    rng: Pcg64,
}

impl Default for Interaction {
    fn default() -> Self {
        Interaction::new(seeded_rng())
    }
}

impl Interaction {
    pub fn new(rng: Pcg64) -> Interaction {
        Interaction {
            selected_marble: None,
            selected_point: None,
            generation: GenerationConfig::default(),
            rng,
        }
    }

    pub fn selected_marble(&self) -> Option<Entity> {
        self.selected_marble
    }

    pub fn selected_point(&self) -> Option<Vector2<f64>> {
        self.selected_point
    }

    pub fn key(&mut self, sim: &mut Simulation, key: Key) {
        let push = match key {
            Key::Left => Vector2::new(-IMPULSE, 0.),
            Key::Right => Vector2::new(IMPULSE, 0.),
            Key::Up => Vector2::new(0., -IMPULSE),
            Key::Down => Vector2::new(0., IMPULSE),
            Key::Space => {
                sim.toggle_gravity();
                return;
            }
        };
        sim.push_all(push);
    }

    pub fn click(
        &mut self,
        sim: &mut Simulation,
        point: Vector2<f64>,
        modifiers: Modifiers,
    ) -> Outcome {
        let outcome = match sim.marble_at(&point) {
            Some(marble) => {
                self.selected_point = None;
                self.click_marble(sim, marble)
            }
            None => self.click_space(sim, point, modifiers),
        };
        debug!("Click at {:?}: {:?}", point, outcome);
        outcome
    }

    fn click_marble(&mut self, sim: &mut Simulation, marble: Entity) -> Outcome {
        match self.selected_marble.take() {
            None => {
                self.selected_marble = Some(marble);
                Outcome::Selected(marble)
            }
            Some(selected) if selected == marble => {
                sim.remove_marble(marble);
                Outcome::Removed(marble)
            }
            Some(selected) => match sim.connect(selected, marble) {
                Some(bound) => Outcome::Connected { bound },
                None => Outcome::Ignored,
            },
        }
    }

    fn click_space(
        &mut self,
        sim: &mut Simulation,
        point: Vector2<f64>,
        modifiers: Modifiers,
    ) -> Outcome {
        if modifiers.shift {
            return match self.selected_point.take() {
                None => {
                    self.selected_point = Some(point);
                    Outcome::PointStored
                }
                Some(start) => Outcome::BoundCreated(sim.add_bound(Bound::new(start, point))),
            };
        }
        self.selected_point = None;
        let radius = match modifiers.size {
            Some(size) => size.radius(),
            None => random_radius(&mut self.rng, &self.generation),
        };
        let marble = Marble::new(point, radius).with_color(random_color(&mut self.rng));
        Outcome::MarbleCreated(sim.spawn_marble(marble))
    }
}
