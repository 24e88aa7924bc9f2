// Invoice numbering module

pub mod controllers;
pub mod models;
pub mod repositories;

pub use models::NumberSequence;
pub use repositories::{MySqlSequenceRepository, SequenceRepository};
