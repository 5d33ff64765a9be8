//! Multiplayer hooks.
//!
//! The game only records the socket messages it would send. Nothing here
//! opens a connection; a transport can drain [`crate::Game::drain_events`] and
//! forward the events as they are.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Message sent to the multiplayer server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NetEvent {
    PlayerJoined { color: Vec3 },
    PlayerMoved { position: Vec3, yaw: f32 },
    PlayerShot { origin: Vec3, direction: Vec3 },
    ZombieKilled { zombie: u32, score: u32 },
    CookieCollected { cookie: u32, health: f32 },
    PlayerDied { score: u32 },
}

impl NetEvent {
    /// Socket event name.
    pub fn name(&self) -> &'static str {
        match self {
            NetEvent::PlayerJoined { .. } => "playerJoined",
            NetEvent::PlayerMoved { .. } => "playerMoved",
            NetEvent::PlayerShot { .. } => "playerShot",
            NetEvent::ZombieKilled { .. } => "zombieKilled",
            NetEvent::CookieCollected { .. } => "cookieCollected",
            NetEvent::PlayerDied { .. } => "playerDied",
        }
    }
}

/// Minimum distance the cat has to move before another position update.
const MOVE_THRESHOLD: f32 = 0.05;

/// Rate limits `playerMoved` updates.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveThrottle {
    interval: f32,
    elapsed: f32,
    last_sent: Option<Vec3>,
}

impl MoveThrottle {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            last_sent: None,
        }
    }

    /// Advances the clock and returns the event to send, if any.
    pub fn poll(&mut self, dt: f32, position: Vec3, yaw: f32) -> Option<NetEvent> {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return None;
        }
        let moved = self
            .last_sent
            .map_or(true, |last| last.distance(position) > MOVE_THRESHOLD);
        if !moved {
            return None;
        }
        self.elapsed = 0.0;
        self.last_sent = Some(position);
        Some(NetEvent::PlayerMoved { position, yaw })
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.last_sent = None;
    }
}
