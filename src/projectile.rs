use glam::Vec3;

use crate::aabb::Aabb;
use crate::scene::{NodeId, SceneGraph, Shape, Transform};

const RADIUS: f32 = 0.18;
const COLOR: Vec3 = Vec3::new(0.85, 0.85, 0.9);

/// Hairball fired by the cat. Travels in a straight line until it hits
/// something or runs out of time.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub position: Vec3,
    pub velocity: Vec3,
    pub ttl: f32,
    node: NodeId,
}

impl Projectile {
    pub fn spawn(
        scene: &mut SceneGraph,
        origin: Vec3,
        direction: Vec3,
        speed: f32,
        ttl: f32,
    ) -> Self {
        let node = scene.add(
            "hairball",
            Shape::Sphere,
            COLOR,
            Transform::from_translation(origin).with_scale(Vec3::splat(RADIUS * 2.0)),
        );
        Self {
            position: origin,
            velocity: direction.normalize_or_zero() * speed,
            ttl,
            node,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.ttl -= dt;
    }

    pub fn expired(&self) -> bool {
        self.ttl <= 0.0 || self.position.y < 0.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, Vec3::splat(RADIUS))
    }

    pub fn sync(&self, scene: &mut SceneGraph) {
        scene.set_position(self.node, self.position);
    }

    pub fn despawn(&self, scene: &mut SceneGraph) {
        scene.remove(self.node);
    }
}
