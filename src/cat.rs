use glam::{Quat, Vec3};

use crate::aabb::Aabb;
use crate::collision::{KinematicBody, StepOutcome};
use crate::config::GameConfig;
use crate::health::{Health, HealthBar};
use crate::props::Prop;
use crate::scene::{NodeId, SceneError, SceneGraph, Shape, Transform};

pub const CAT_HALF_EXTENTS: Vec3 = Vec3::new(0.45, 0.55, 0.6);
pub const DEFAULT_FUR: Vec3 = Vec3::new(0.95, 0.6, 0.25);

const EAR_COLOR: Vec3 = Vec3::new(0.95, 0.7, 0.7);

/// Per-frame movement request derived from input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    /// Desired horizontal direction in world space; zero when idle.
    pub direction: Vec3,
    pub sprint: bool,
    pub jump: bool,
}

/// The player.
#[derive(Debug, Clone)]
pub struct Cat {
    pub body: KinematicBody,
    pub health: Health,
    pub yaw: f32,
    pub color: Vec3,
    fire_timer: f32,
    root: NodeId,
    fur: Vec<NodeId>,
    health_bar: HealthBar,
}

impl Cat {
    pub fn spawn(
        scene: &mut SceneGraph,
        position: Vec3,
        color: Vec3,
        config: &GameConfig,
    ) -> Result<Self, SceneError> {
        let root = scene.add(
            "cat",
            Shape::Group,
            Vec3::ONE,
            Transform::from_translation(position),
        );
        let body = scene.add_child(
            root,
            "cat-body",
            Shape::Cube,
            color,
            Transform::from_translation(Vec3::new(0.0, 0.45, 0.0))
                .with_scale(Vec3::new(0.8, 0.5, 1.1)),
        )?;
        let head = scene.add_child(
            root,
            "cat-head",
            Shape::Cube,
            color,
            Transform::from_translation(Vec3::new(0.0, 0.85, -0.55))
                .with_scale(Vec3::splat(0.5)),
        )?;
        for (side, x) in [("left", -0.15), ("right", 0.15)] {
            scene.add_child(
                root,
                format!("cat-ear-{side}"),
                Shape::Cube,
                EAR_COLOR,
                Transform::from_translation(Vec3::new(x, 1.15, -0.55))
                    .with_scale(Vec3::new(0.12, 0.15, 0.08)),
            )?;
        }
        let tail = scene.add_child(
            root,
            "cat-tail",
            Shape::Cylinder,
            color,
            Transform::from_translation(Vec3::new(0.0, 0.8, 0.65))
                .with_rotation(Quat::from_rotation_x(-0.5))
                .with_scale(Vec3::new(0.1, 0.7, 0.1)),
        )?;
        let health_bar = HealthBar::spawn(scene, "cat", 1.2, true)?;

        Ok(Self {
            body: KinematicBody::new(position, CAT_HALF_EXTENTS),
            health: Health::new(config.cat_health),
            yaw: 0.0,
            color,
            fire_timer: 0.0,
            root,
            fur: vec![body, head, tail],
            health_bar,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn bounds(&self) -> Aabb {
        self.body.bounds()
    }

    /// Unit vector the cat is facing on the ground plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Where shots leave the cat.
    pub fn muzzle(&self) -> Vec3 {
        self.position() + Vec3::Y * 0.85 + self.forward() * 0.9
    }

    pub fn set_color(&mut self, scene: &mut SceneGraph, color: Vec3) {
        self.color = color;
        for node in &self.fur {
            scene.set_color(*node, color);
        }
    }

    /// Applies movement input and integrates physics for one frame.
    pub fn update(
        &mut self,
        dt: f32,
        intent: MoveIntent,
        props: &[Prop],
        config: &GameConfig,
    ) -> StepOutcome {
        self.fire_timer = (self.fire_timer - dt).max(0.0);

        let direction = intent.direction * Vec3::new(1.0, 0.0, 1.0);
        let speed = if intent.sprint {
            config.cat_speed * config.sprint_multiplier
        } else {
            config.cat_speed
        };
        if direction.length_squared() > f32::EPSILON {
            let direction = direction.normalize();
            self.body.velocity.x = direction.x * speed;
            self.body.velocity.z = direction.z * speed;
            self.yaw = (-direction.x).atan2(-direction.z);
        } else {
            self.body.velocity.x = 0.0;
            self.body.velocity.z = 0.0;
        }
        if intent.jump && self.body.grounded {
            self.body.velocity.y = config.jump_speed;
        }

        self.body.step(
            dt,
            config.gravity,
            config.trampoline_bounce,
            props,
            config.arena_size,
        )
    }

    /// Starts the fire cooldown if the cat may shoot this frame.
    pub fn try_fire(&mut self, cooldown: f32) -> bool {
        if self.fire_timer > 0.0 {
            return false;
        }
        self.fire_timer = cooldown;
        true
    }

    /// Pushes the current state into the scene graph.
    pub fn sync(&self, scene: &mut SceneGraph, camera_yaw: f32) {
        scene.set_transform(
            self.root,
            Transform::from_translation(self.position())
                .with_rotation(Quat::from_rotation_y(self.yaw)),
        );
        self.health_bar.update(
            scene,
            self.position() + Vec3::Y * 1.7,
            self.health.fraction(),
            camera_yaw,
        );
    }

    /// Puts the cat back at `position` with full health.
    pub fn respawn(&mut self, position: Vec3) {
        self.body = KinematicBody::new(position, CAT_HALF_EXTENTS);
        self.health.reset();
        self.yaw = 0.0;
        self.fire_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_cat(scene: &mut SceneGraph) -> Cat {
        Cat::spawn(scene, Vec3::ZERO, DEFAULT_FUR, &GameConfig::default()).unwrap()
    }

    #[test]
    fn walking_moves_and_turns_the_cat() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut cat = spawn_cat(&mut scene);
        let intent = MoveIntent {
            direction: Vec3::X,
            ..MoveIntent::default()
        };
        for _ in 0..60 {
            cat.update(1.0 / 60.0, intent, &[], &config);
        }
        assert!((cat.position().x - config.cat_speed).abs() < 1e-3);
        assert!(cat.forward().distance(Vec3::X) < 1e-5);
    }

    #[test]
    fn sprint_is_faster() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut walker = spawn_cat(&mut scene);
        let mut sprinter = spawn_cat(&mut scene);
        let walk = MoveIntent {
            direction: Vec3::NEG_Z,
            ..MoveIntent::default()
        };
        let sprint = MoveIntent {
            sprint: true,
            ..walk
        };
        walker.update(0.1, walk, &[], &config);
        sprinter.update(0.1, sprint, &[], &config);
        assert!(sprinter.position().z < walker.position().z);
    }

    #[test]
    fn jump_only_from_the_ground() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut cat = spawn_cat(&mut scene);
        let jump = MoveIntent {
            jump: true,
            ..MoveIntent::default()
        };
        cat.update(1.0 / 60.0, jump, &[], &config);
        assert!(cat.position().y > 0.0);
        let velocity = cat.body.velocity.y;
        cat.update(1.0 / 60.0, jump, &[], &config);
        assert!(cat.body.velocity.y < velocity);
    }

    #[test]
    fn fire_respects_cooldown() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut cat = spawn_cat(&mut scene);
        assert!(cat.try_fire(0.25));
        assert!(!cat.try_fire(0.25));
        cat.update(0.3, MoveIntent::default(), &[], &config);
        assert!(cat.try_fire(0.25));
    }

    #[test]
    fn recolor_touches_fur_only() {
        let mut scene = SceneGraph::new();
        let mut cat = spawn_cat(&mut scene);
        cat.set_color(&mut scene, Vec3::new(0.1, 0.1, 0.1));
        let body = scene.find_by_name("cat-body").unwrap();
        let ear = scene.find_by_name("cat-ear-left").unwrap();
        assert_eq!(scene.get(body).unwrap().color, Vec3::new(0.1, 0.1, 0.1));
        assert_eq!(scene.get(ear).unwrap().color, EAR_COLOR);
    }
}
