//! Tallgrass library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the overworld, battles and saves without a window or GPU.

pub mod shared;
pub mod settings;
pub mod input;
pub mod bag;
pub mod world;
pub mod player;
pub mod encounter;
pub mod scene;
pub mod battle;
pub mod save;
pub mod data;
pub mod ui;
