//! Core system components shared between tasks
pub mod command;
pub mod config;
pub mod encoders;
pub mod resources;
