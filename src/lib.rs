//! Cat vs Zombies: a small third-person arcade game.
//!
//! The simulation (scene graph, physics, AI, spawning) lives in plain modules
//! that run without a window, so the whole game can be driven and tested
//! headless. [`render`] and [`app`] add the wgpu renderer and winit glue on
//! top; [`web`] wires the same pieces to a browser canvas.

pub mod aabb;
pub mod app;
pub mod camera;
pub mod cat;
pub mod collision;
pub mod config;
pub mod cookie;
pub mod game;
pub mod health;
pub mod input;
pub mod level;
pub mod mesh;
pub mod net;
pub mod projectile;
pub mod props;
pub mod render;
pub mod scene;
#[cfg(target_arch = "wasm32")]
pub mod web;
pub mod zombie;

pub use aabb::Aabb;
pub use camera::CameraController;
pub use config::GameConfig;
pub use game::{Game, GameSnapshot, Phase};
pub use input::{Action, Bindings, InputState, KeyCode, MouseButton, NamedKey};
pub use level::Level;
pub use net::NetEvent;
pub use render::{CameraParams, LightParams, Renderer};
pub use scene::{NodeId, SceneGraph, Shape, Transform};
