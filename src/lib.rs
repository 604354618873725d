//! Poster maker backend - generates print and social posters from a title,
//! a theme and a layout template
//!
//! Copy and background art come from pluggable AI providers; composition,
//! text fitting and storage happen locally. The HTTP surface lives in `api`.

pub mod ai;
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod prompts;
pub mod registry;
pub mod render;
pub mod service;
pub mod store;

pub use error::{Error, Result};
