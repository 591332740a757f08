//! Tidefall library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual simulation entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can import simulation types, systems, and resources without
//! standing up the full runner loop.

pub mod shared;
pub mod economy;
pub mod world;
pub mod entities;
pub mod actions;
pub mod combat;
pub mod npc;
pub mod sim;
pub mod data;
