pub mod connection;
pub mod distribution;
pub mod games;
pub mod matchups;
pub mod models;
pub mod players;
pub mod ratings;
pub mod setup;

pub use connection::{create_memory_pool, create_pool, get_connection, DbConn, DbPool};
pub use models::*;
