use glam::{Quat, Vec3};

use crate::aabb::Aabb;
use crate::scene::{NodeId, SceneError, SceneGraph, Shape, Transform};

const DOUGH: Vec3 = Vec3::new(0.82, 0.6, 0.32);
const CHOCOLATE: Vec3 = Vec3::new(0.25, 0.13, 0.06);
const HOVER_HEIGHT: f32 = 0.8;
const BOB_AMPLITUDE: f32 = 0.2;
const SPIN_RATE: f32 = 2.0;
const HALF_EXTENTS: Vec3 = Vec3::new(0.45, 0.45, 0.45);

/// Collectible cookie that heals the cat.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub id: u32,
    pub position: Vec3,
    age: f32,
    root: NodeId,
}

impl Cookie {
    pub fn spawn(scene: &mut SceneGraph, id: u32, position: Vec3) -> Result<Self, SceneError> {
        let name = format!("cookie-{id}");
        let root = scene.add(
            name.clone(),
            Shape::Group,
            Vec3::ONE,
            Transform::from_translation(position + Vec3::Y * HOVER_HEIGHT),
        );
        // Stood on its edge so the spin shows the face.
        scene.add_child(
            root,
            format!("{name}-dough"),
            Shape::Cylinder,
            DOUGH,
            Transform::IDENTITY
                .with_rotation(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2))
                .with_scale(Vec3::new(0.8, 0.15, 0.8)),
        )?;
        for (index, offset) in [(-0.18, 0.15), (0.2, 0.05), (0.0, -0.2)].into_iter().enumerate() {
            scene.add_child(
                root,
                format!("{name}-chip-{index}"),
                Shape::Sphere,
                CHOCOLATE,
                Transform::from_translation(Vec3::new(offset.0, offset.1, 0.08))
                    .with_scale(Vec3::splat(0.12)),
            )?;
        }
        Ok(Self {
            id,
            position,
            age: 0.0,
            root,
        })
    }

    pub fn update(&mut self, dt: f32) {
        self.age += dt;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position + Vec3::Y * HOVER_HEIGHT, HALF_EXTENTS)
            .expand(BOB_AMPLITUDE)
    }

    pub fn sync(&self, scene: &mut SceneGraph) {
        let bob = (self.age * 3.0).sin() * BOB_AMPLITUDE;
        scene.set_transform(
            self.root,
            Transform::from_translation(self.position + Vec3::Y * (HOVER_HEIGHT + bob))
                .with_rotation(Quat::from_rotation_y(self.age * SPIN_RATE)),
        );
    }

    pub fn despawn(&self, scene: &mut SceneGraph) {
        scene.remove(self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cat::CAT_HALF_EXTENTS;
    use crate::collision::bounds_at;

    #[test]
    fn cat_standing_on_cookie_touches_it() {
        let mut scene = SceneGraph::new();
        let cookie = Cookie::spawn(&mut scene, 1, Vec3::new(3.0, 0.0, 3.0)).unwrap();
        let cat = bounds_at(Vec3::new(3.2, 0.0, 2.9), CAT_HALF_EXTENTS);
        assert!(cookie.bounds().intersects(&cat));
        let far = bounds_at(Vec3::new(6.0, 0.0, 3.0), CAT_HALF_EXTENTS);
        assert!(!cookie.bounds().intersects(&far));
    }

    #[test]
    fn spinning_cookie_stays_in_place() {
        let mut scene = SceneGraph::new();
        let mut cookie = Cookie::spawn(&mut scene, 1, Vec3::ZERO).unwrap();
        cookie.update(0.5);
        cookie.sync(&mut scene);
        let bounds = scene.world_bounds(cookie.root).unwrap();
        assert!(cookie.bounds().expand(0.1).contains_point(bounds.center()));
        cookie.despawn(&mut scene);
        assert!(scene.is_empty());
    }
}
