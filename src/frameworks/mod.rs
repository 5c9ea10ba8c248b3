// Frameworks layer: process bootstrap and runtime configuration.

pub mod app;
pub mod cli;
pub mod config;
