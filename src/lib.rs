pub mod advance;
pub mod bound;
pub mod collision;
pub mod input;
pub mod marble;
pub mod render;
pub mod simulation;
pub mod vector;
pub mod world_gen;

pub use bound::{Bound, Link};
pub use input::{Interaction, Key, MarbleSize, Modifiers, Outcome};
pub use marble::{Connection, Marble};
pub use render::{Canvas, DisplayConfig};
pub use simulation::{Simulation, SimulationConfig};
