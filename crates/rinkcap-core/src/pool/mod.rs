// Player pool: data model, mutations, and read-side budget projections.

pub mod budget;
pub mod mutation;
pub mod player;
pub mod store;

pub use player::{OwnershipStatus, Player, PlayerRecord, Position};
pub use store::{PlayerFilter, PlayerPool, PoolError};
