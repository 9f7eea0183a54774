pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod pipeline;
