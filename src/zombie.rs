use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::aabb::Aabb;
use crate::collision::{bounds_at, push_out_of_solids};
use crate::config::GameConfig;
use crate::health::{Health, HealthBar};
use crate::props::Prop;
use crate::scene::{NodeId, SceneError, SceneGraph, Shape, Transform};

pub const ZOMBIE_HALF_EXTENTS: Vec3 = Vec3::new(0.45, 0.95, 0.45);

const SKIN: Vec3 = Vec3::new(0.45, 0.7, 0.35);
const SHIRT: Vec3 = Vec3::new(0.3, 0.25, 0.45);
const WANDER_SPEED_FACTOR: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZombieState {
    Wandering,
    Chasing,
    Attacking,
}

/// Enemy that shambles towards the cat and hurts it on contact.
#[derive(Debug, Clone)]
pub struct Zombie {
    pub id: u32,
    pub position: Vec3,
    pub yaw: f32,
    pub health: Health,
    state: ZombieState,
    heading: Vec3,
    wander_timer: f32,
    attack_timer: f32,
    root: NodeId,
    health_bar: HealthBar,
}

impl Zombie {
    pub fn spawn(
        scene: &mut SceneGraph,
        id: u32,
        position: Vec3,
        config: &GameConfig,
    ) -> Result<Self, SceneError> {
        let name = format!("zombie-{id}");
        let root = scene.add(
            name.clone(),
            Shape::Group,
            Vec3::ONE,
            Transform::from_translation(position),
        );
        scene.add_child(
            root,
            format!("{name}-torso"),
            Shape::Cube,
            SHIRT,
            Transform::from_translation(Vec3::new(0.0, 0.95, 0.0))
                .with_scale(Vec3::new(0.8, 0.9, 0.45)),
        )?;
        scene.add_child(
            root,
            format!("{name}-legs"),
            Shape::Cube,
            Vec3::new(0.25, 0.25, 0.3),
            Transform::from_translation(Vec3::new(0.0, 0.25, 0.0))
                .with_scale(Vec3::new(0.7, 0.5, 0.4)),
        )?;
        scene.add_child(
            root,
            format!("{name}-head"),
            Shape::Cube,
            SKIN,
            Transform::from_translation(Vec3::new(0.0, 1.65, 0.0)).with_scale(Vec3::splat(0.5)),
        )?;
        for (side, x) in [("left", -0.3), ("right", 0.3)] {
            scene.add_child(
                root,
                format!("{name}-arm-{side}"),
                Shape::Cube,
                SKIN,
                Transform::from_translation(Vec3::new(x, 1.25, -0.4))
                    .with_scale(Vec3::new(0.18, 0.18, 0.8)),
            )?;
        }
        let health_bar = HealthBar::spawn(scene, &name, 1.0, false)?;

        Ok(Self {
            id,
            position,
            yaw: 0.0,
            health: Health::new(config.zombie_health),
            state: ZombieState::Wandering,
            heading: Vec3::ZERO,
            wander_timer: 0.0,
            attack_timer: 0.0,
            root,
            health_bar,
        })
    }

    pub fn state(&self) -> ZombieState {
        self.state
    }

    pub fn bounds(&self) -> Aabb {
        bounds_at(self.position, ZOMBIE_HALF_EXTENTS)
    }

    /// Runs the AI for one frame. Returns the damage dealt to the cat.
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        cat_bounds: &Aabb,
        props: &[Prop],
        config: &GameConfig,
        rng: &mut R,
    ) -> f32 {
        self.attack_timer = (self.attack_timer - dt).max(0.0);
        self.wander_timer -= dt;

        let cat_position = Vec3::new(cat_bounds.center().x, 0.0, cat_bounds.center().z);
        let to_cat = (cat_position - self.position) * Vec3::new(1.0, 0.0, 1.0);
        let touching = self.bounds().intersects(cat_bounds);

        self.state = if touching {
            ZombieState::Attacking
        } else if to_cat.length() <= config.zombie_aggro_radius {
            ZombieState::Chasing
        } else {
            ZombieState::Wandering
        };

        let velocity = match self.state {
            ZombieState::Attacking => Vec3::ZERO,
            ZombieState::Chasing => to_cat.normalize_or_zero() * config.zombie_speed,
            ZombieState::Wandering => {
                if self.wander_timer <= 0.0 {
                    let angle = rng.gen_range(0.0..TAU);
                    self.heading = Vec3::new(angle.cos(), 0.0, angle.sin());
                    self.wander_timer = rng.gen_range(2.0..5.0);
                }
                self.heading * config.zombie_speed * WANDER_SPEED_FACTOR
            }
        };

        let facing = if self.state == ZombieState::Wandering {
            velocity
        } else {
            to_cat
        };
        if facing.length_squared() > f32::EPSILON {
            self.yaw = (-facing.x).atan2(-facing.z);
        }

        let moved = self.position + velocity * dt;
        let mut position = push_out_of_solids(moved, ZOMBIE_HALF_EXTENTS, props);
        let limit = (config.arena_size - ZOMBIE_HALF_EXTENTS.x).max(0.0);
        position.x = position.x.clamp(-limit, limit);
        position.z = position.z.clamp(-limit, limit);
        self.position = position;

        if self.state == ZombieState::Attacking && self.attack_timer <= 0.0 {
            self.attack_timer = config.zombie_attack_cooldown;
            return config.zombie_damage;
        }
        0.0
    }

    /// Applies damage and reports whether the zombie died.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health.damage(amount);
        self.health.is_dead()
    }

    pub fn sync(&self, scene: &mut SceneGraph, camera_yaw: f32) {
        scene.set_transform(
            self.root,
            Transform::from_translation(self.position)
                .with_rotation(Quat::from_rotation_y(self.yaw)),
        );
        self.health_bar.update(
            scene,
            self.position + Vec3::Y * 2.3,
            self.health.fraction(),
            camera_yaw,
        );
    }

    pub fn despawn(&self, scene: &mut SceneGraph) {
        scene.remove(self.root);
        self.health_bar.despawn(scene);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::cat::CAT_HALF_EXTENTS;

    fn cat_at(position: Vec3) -> Aabb {
        bounds_at(position, CAT_HALF_EXTENTS)
    }

    #[test]
    fn chases_cat_inside_aggro_radius() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut zombie = Zombie::spawn(&mut scene, 1, Vec3::new(10.0, 0.0, 0.0), &config).unwrap();
        let cat = cat_at(Vec3::ZERO);
        let damage = zombie.update(0.5, &cat, &[], &config, &mut rng);
        assert_eq!(damage, 0.0);
        assert_eq!(zombie.state(), ZombieState::Chasing);
        assert!((zombie.position.x - (10.0 - config.zombie_speed * 0.5)).abs() < 1e-4);
    }

    #[test]
    fn wanders_when_cat_is_far() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut zombie = Zombie::spawn(&mut scene, 1, Vec3::ZERO, &config).unwrap();
        let cat = cat_at(Vec3::new(35.0, 0.0, 35.0));
        zombie.update(1.0, &cat, &[], &config, &mut rng);
        assert_eq!(zombie.state(), ZombieState::Wandering);
        let travelled = zombie.position.length();
        assert!((travelled - config.zombie_speed * WANDER_SPEED_FACTOR).abs() < 1e-4);
    }

    #[test]
    fn attacks_on_cooldown_while_touching() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut zombie = Zombie::spawn(&mut scene, 1, Vec3::new(0.5, 0.0, 0.0), &config).unwrap();
        let cat = cat_at(Vec3::ZERO);
        assert_eq!(zombie.update(0.1, &cat, &[], &config, &mut rng), config.zombie_damage);
        assert_eq!(zombie.state(), ZombieState::Attacking);
        assert_eq!(zombie.update(0.1, &cat, &[], &config, &mut rng), 0.0);
        let mut dealt = 0.0;
        for _ in 0..10 {
            dealt += zombie.update(0.1, &cat, &[], &config, &mut rng);
        }
        assert_eq!(dealt, config.zombie_damage);
    }

    #[test]
    fn dies_after_enough_damage_and_despawns() {
        let mut scene = SceneGraph::new();
        let config = GameConfig::default();
        let zombie = Zombie::spawn(&mut scene, 7, Vec3::ZERO, &config).unwrap();
        let mut zombie = zombie;
        assert!(!zombie.take_damage(config.zombie_health * 0.5));
        assert!(zombie.take_damage(config.zombie_health * 0.5));
        zombie.despawn(&mut scene);
        assert!(scene.is_empty());
    }
}
