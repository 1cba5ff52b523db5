//! Core translation engine module

pub mod backend;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod sanitizer;
