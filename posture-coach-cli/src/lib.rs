// Library exports for the Posture Coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod ui;
