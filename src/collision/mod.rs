pub mod collidable;
pub mod colliders;
pub mod collision;
pub mod solvers;
pub use collidable::{Collidable, Response, Rod, RodEnd};
pub use collision::collide_bounds_system;
pub use collision::collide_marbles_system;
pub use collision::CollisionStats;
