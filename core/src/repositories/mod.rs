//! Repository interfaces (and test doubles) for data persistence

pub mod user;

pub use user::{MockUserRepository, UserRepository};
