pub mod document_renderer;

pub use document_renderer::{BusinessProfile, DocumentRenderer};
