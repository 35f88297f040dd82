// Clippy allows for reasonable defaults
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::unnecessary_map_or)] // map_or can be clearer than alternatives
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f

// Module declarations
pub mod api;
pub mod config;
pub mod models;
pub mod reorder;
pub mod settings;
pub mod storage;
pub mod templates;
pub mod utils;

// Re-export models for use by callers
pub use models::*;
