use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{NodeId, SceneError, SceneGraph, Shape, Transform};

/// Hit points of a cat or zombie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(1.0);
        Self { current: max, max }
    }

    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn fraction(&self) -> f32 {
        (self.current / self.max).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }
}

const BAR_HEIGHT: f32 = 0.12;
const BAR_DEPTH: f32 = 0.02;
const LOW_COLOR: Vec3 = Vec3::new(0.9, 0.1, 0.1);
const HIGH_COLOR: Vec3 = Vec3::new(0.2, 0.85, 0.2);

/// Floating bar drawn above an entity, always turned towards the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthBar {
    root: NodeId,
    fill: NodeId,
    width: f32,
    hide_when_full: bool,
}

impl HealthBar {
    pub fn spawn(
        scene: &mut SceneGraph,
        name: &str,
        width: f32,
        hide_when_full: bool,
    ) -> Result<Self, SceneError> {
        let root = scene.add(
            format!("{name}-health"),
            Shape::Group,
            Vec3::ONE,
            Transform::IDENTITY,
        );
        scene.add_child(
            root,
            format!("{name}-health-bg"),
            Shape::Cube,
            Vec3::splat(0.08),
            Transform::IDENTITY.with_scale(Vec3::new(width + 0.06, BAR_HEIGHT + 0.06, BAR_DEPTH)),
        )?;
        let fill = scene.add_child(
            root,
            format!("{name}-health-fill"),
            Shape::Cube,
            HIGH_COLOR,
            Transform::from_translation(Vec3::new(0.0, 0.0, BAR_DEPTH))
                .with_scale(Vec3::new(width, BAR_HEIGHT, BAR_DEPTH)),
        )?;
        let bar = Self {
            root,
            fill,
            width,
            hide_when_full,
        };
        if hide_when_full {
            scene.set_visible(root, false);
        }
        Ok(bar)
    }

    /// Places the bar at `position` and redraws the fill for `fraction`.
    pub fn update(&self, scene: &mut SceneGraph, position: Vec3, fraction: f32, facing_yaw: f32) {
        let fraction = fraction.clamp(0.0, 1.0);
        scene.set_transform(
            self.root,
            Transform::from_translation(position).with_rotation(Quat::from_rotation_y(facing_yaw)),
        );
        let fill_width = (self.width * fraction).max(0.001);
        scene.set_transform(
            self.fill,
            Transform::from_translation(Vec3::new(
                -0.5 * (self.width - fill_width),
                0.0,
                BAR_DEPTH,
            ))
            .with_scale(Vec3::new(fill_width, BAR_HEIGHT, BAR_DEPTH)),
        );
        scene.set_color(self.fill, bar_color(fraction));
        scene.set_visible(self.root, !(self.hide_when_full && fraction >= 1.0));
    }

    pub fn despawn(&self, scene: &mut SceneGraph) {
        scene.remove(self.root);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

/// Red when empty, green when full.
pub fn bar_color(fraction: f32) -> Vec3 {
    LOW_COLOR.lerp(HIGH_COLOR, fraction.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_is_clamped() {
        let mut health = Health::new(100.0);
        health.damage(30.0);
        assert_eq!(health.current, 70.0);
        health.heal(500.0);
        assert_eq!(health.current, 100.0);
        health.damage(250.0);
        assert!(health.is_dead());
        assert_eq!(health.fraction(), 0.0);
        health.reset();
        assert_eq!(health.fraction(), 1.0);
    }

    #[test]
    fn fill_is_left_aligned() {
        let mut scene = SceneGraph::new();
        let bar = HealthBar::spawn(&mut scene, "zombie-1", 1.0, false).unwrap();
        bar.update(&mut scene, Vec3::new(0.0, 2.0, 0.0), 0.5, 0.0);
        let fill = scene.get(bar.fill).unwrap();
        assert!((fill.transform.scale.x - 0.5).abs() < 1e-6);
        assert!((fill.transform.translation.x + 0.25).abs() < 1e-6);
        assert_eq!(fill.color, bar_color(0.5));
        let bounds = scene.world_bounds(bar.fill).unwrap();
        assert!((bounds.min.x + 0.5).abs() < 1e-5);
    }

    #[test]
    fn full_bar_can_hide() {
        let mut scene = SceneGraph::new();
        let bar = HealthBar::spawn(&mut scene, "cat", 1.2, true).unwrap();
        bar.update(&mut scene, Vec3::ZERO, 1.0, 0.0);
        assert!(!scene.get(bar.root()).unwrap().visible);
        bar.update(&mut scene, Vec3::ZERO, 0.4, 0.0);
        assert!(scene.get(bar.root()).unwrap().visible);
        bar.despawn(&mut scene);
        assert!(scene.is_empty());
    }
}
