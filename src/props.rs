use anyhow::{anyhow, Result};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::scene::{NodeId, SceneGraph, Shape, Transform};

/// Kind of static level prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    Tree,
    Rock,
    Billboard,
    Trampoline,
    Walkway,
    ColorSelector,
}

impl PropKind {
    pub fn from_name(name: &str) -> Result<Self> {
        let kind = match name {
            "tree" => PropKind::Tree,
            "rock" => PropKind::Rock,
            "billboard" => PropKind::Billboard,
            "trampoline" => PropKind::Trampoline,
            "walkway" => PropKind::Walkway,
            "color_selector" => PropKind::ColorSelector,
            other => return Err(anyhow!("unknown prop kind {other:?}")),
        };
        Ok(kind)
    }

    pub fn default_size(self) -> Vec3 {
        match self {
            PropKind::Tree => Vec3::new(2.5, 5.0, 2.5),
            PropKind::Rock => Vec3::new(1.6, 1.0, 1.4),
            PropKind::Billboard => Vec3::new(6.0, 4.0, 0.3),
            PropKind::Trampoline => Vec3::new(3.0, 0.6, 3.0),
            PropKind::Walkway => Vec3::new(3.0, 1.0, 10.0),
            PropKind::ColorSelector => Vec3::new(2.0, 0.1, 2.0),
        }
    }

    pub fn default_color(self) -> Vec3 {
        match self {
            PropKind::Tree => Vec3::new(0.16, 0.45, 0.18),
            PropKind::Rock => Vec3::new(0.45, 0.45, 0.48),
            PropKind::Billboard => Vec3::new(0.95, 0.85, 0.3),
            PropKind::Trampoline => Vec3::new(0.15, 0.35, 0.9),
            PropKind::Walkway => Vec3::new(0.55, 0.4, 0.25),
            PropKind::ColorSelector => Vec3::ONE,
        }
    }

    /// Bodies cannot pass through solid props.
    pub fn is_solid(self) -> bool {
        matches!(self, PropKind::Tree | PropKind::Rock | PropKind::Billboard)
    }

    /// Bodies can stand on top of walkable props.
    pub fn is_walkable(self) -> bool {
        matches!(self, PropKind::Walkway | PropKind::Trampoline)
    }
}

/// Prop placement read from a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    pub name: String,
    pub kind: PropKind,
    pub position: Vec3,
    pub size: Vec3,
    /// Degrees around the Y axis.
    pub rotation: f32,
    pub color: Vec3,
}

impl PropSpec {
    pub fn new(name: impl Into<String>, kind: PropKind, position: Vec3) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            size: kind.default_size(),
            rotation: 0.0,
            color: kind.default_color(),
        }
    }
}

/// Static prop living in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub name: String,
    pub kind: PropKind,
    pub color: Vec3,
    pub bounds: Aabb,
    root: NodeId,
}

impl Prop {
    /// Builds the meshes for `spec` and computes its collider from them.
    pub fn spawn(scene: &mut SceneGraph, spec: &PropSpec) -> Result<Self> {
        let root = scene.add(
            spec.name.clone(),
            Shape::Group,
            Vec3::ONE,
            Transform::from_translation(spec.position)
                .with_rotation(Quat::from_rotation_y(spec.rotation.to_radians())),
        );
        let size = spec.size;
        let name = &spec.name;
        let collider = match spec.kind {
            PropKind::Tree => {
                let trunk_height = size.y * 0.4;
                let trunk = scene.add_child(
                    root,
                    format!("{name}-trunk"),
                    Shape::Cylinder,
                    Vec3::new(0.4, 0.26, 0.13),
                    Transform::from_translation(Vec3::Y * trunk_height * 0.5)
                        .with_scale(Vec3::new(size.x * 0.2, trunk_height, size.z * 0.2)),
                )?;
                scene.add_child(
                    root,
                    format!("{name}-canopy"),
                    Shape::Sphere,
                    spec.color,
                    Transform::from_translation(Vec3::Y * (trunk_height + size.y * 0.3))
                        .with_scale(Vec3::new(size.x, size.y * 0.6, size.z)),
                )?;
                trunk
            }
            PropKind::Rock => scene.add_child(
                root,
                format!("{name}-stone"),
                Shape::Sphere,
                spec.color,
                Transform::from_translation(Vec3::Y * size.y * 0.5).with_scale(size),
            )?,
            PropKind::Billboard => {
                let post_height = size.y * 0.5;
                for (side, offset) in [("left", -0.4), ("right", 0.4)] {
                    scene.add_child(
                        root,
                        format!("{name}-post-{side}"),
                        Shape::Cube,
                        Vec3::new(0.3, 0.3, 0.32),
                        Transform::from_translation(Vec3::new(
                            size.x * offset,
                            post_height * 0.5,
                            0.0,
                        ))
                        .with_scale(Vec3::new(0.25, post_height, 0.25)),
                    )?;
                }
                scene.add_child(
                    root,
                    format!("{name}-board"),
                    Shape::Cube,
                    spec.color,
                    Transform::from_translation(Vec3::Y * (post_height + size.y * 0.25))
                        .with_scale(Vec3::new(size.x, size.y * 0.5, size.z)),
                )?;
                root
            }
            PropKind::Trampoline => {
                scene.add_child(
                    root,
                    format!("{name}-frame"),
                    Shape::Cylinder,
                    Vec3::splat(0.2),
                    Transform::from_translation(Vec3::Y * size.y * 0.45)
                        .with_scale(Vec3::new(size.x, size.y * 0.9, size.z)),
                )?;
                scene.add_child(
                    root,
                    format!("{name}-mat"),
                    Shape::Cylinder,
                    spec.color,
                    Transform::from_translation(Vec3::Y * size.y * 0.95)
                        .with_scale(Vec3::new(size.x * 0.85, size.y * 0.1, size.z * 0.85)),
                )?;
                root
            }
            PropKind::Walkway => scene.add_child(
                root,
                format!("{name}-deck"),
                Shape::Cube,
                spec.color,
                Transform::from_translation(Vec3::Y * size.y * 0.5).with_scale(size),
            )?,
            PropKind::ColorSelector => scene.add_child(
                root,
                format!("{name}-pad"),
                Shape::Cube,
                spec.color,
                Transform::from_translation(Vec3::Y * size.y * 0.5).with_scale(size),
            )?,
        };
        let bounds = scene
            .world_bounds(collider)
            .ok_or_else(|| anyhow!("prop {name} has no drawable geometry"))?;
        Ok(Self {
            name: spec.name.clone(),
            kind: spec.kind,
            color: spec.color,
            bounds,
            root,
        })
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }

    pub fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_collider_is_the_trunk() {
        let mut scene = SceneGraph::new();
        let spec = PropSpec::new("oak", PropKind::Tree, Vec3::new(4.0, 0.0, -2.0));
        let prop = Prop::spawn(&mut scene, &spec).unwrap();
        assert!(prop.is_solid());
        assert!(prop.bounds.size().x < spec.size.x);
        assert!((prop.bounds.center().x - 4.0).abs() < 1e-4);
        assert!(prop.bounds.min.y.abs() < 1e-4);
        let whole = scene.world_bounds(prop.root()).unwrap();
        assert!(whole.max.y > prop.bounds.max.y);
    }

    #[test]
    fn walkway_top_matches_its_height() {
        let mut scene = SceneGraph::new();
        let mut spec = PropSpec::new("bridge", PropKind::Walkway, Vec3::ZERO);
        spec.size = Vec3::new(2.0, 1.5, 8.0);
        let prop = Prop::spawn(&mut scene, &spec).unwrap();
        assert!(prop.is_walkable());
        assert!((prop.bounds.max.y - 1.5).abs() < 1e-5);
        assert!((prop.bounds.max.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_swaps_footprint_axes() {
        let mut scene = SceneGraph::new();
        let mut spec = PropSpec::new("sign", PropKind::Billboard, Vec3::ZERO);
        spec.rotation = 90.0;
        let prop = Prop::spawn(&mut scene, &spec).unwrap();
        let size = prop.bounds.size();
        assert!(size.z > size.x);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        assert!(PropKind::from_name("volcano").is_err());
        assert_eq!(
            PropKind::from_name("color_selector").unwrap(),
            PropKind::ColorSelector
        );
    }
}
