pub mod sequence_repository;

pub use sequence_repository::{MySqlSequenceRepository, SequenceRepository};
