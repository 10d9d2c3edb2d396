//! raziel library crate.
//!
//! This module exposes the internal components for integration testing.

pub mod camera;
pub mod cli;
pub mod event_log;
pub mod event_loop;
pub mod input;
pub mod ndvi;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod settings;
pub mod terminal;
