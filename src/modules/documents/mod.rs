// Document rendering module

pub mod services;

pub use services::{BusinessProfile, DocumentRenderer};
