use std::collections::BTreeMap;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aabb::Aabb;

/// Handle to a node stored in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

/// Primitive drawn for a node. `Group` nodes only carry a transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Group,
    Cube,
    Sphere,
    Cylinder,
    Plane,
}

impl Shape {
    pub fn is_drawable(self) -> bool {
        !matches!(self, Shape::Group)
    }

    /// Bounds of the unit mesh in local space.
    pub fn local_bounds(self) -> Option<Aabb> {
        match self {
            Shape::Group => None,
            Shape::Plane => Some(Aabb::new(
                Vec3::new(-0.5, 0.0, -0.5),
                Vec3::new(0.5, 0.0, 0.5),
            )),
            _ => Some(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5))),
        }
    }
}

/// Local transform of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Node stored in the scene graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub shape: Shape,
    pub color: Vec3,
    pub transform: Transform,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Drawable node resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub shape: Shape,
    pub color: Vec3,
    pub model: Mat4,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene node {0:?} does not exist")]
    MissingNode(NodeId),
}

/// Retained scene graph handed to the renderer every frame.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a root node.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        shape: Shape,
        color: Vec3,
        transform: Transform,
    ) -> NodeId {
        self.insert(name.into(), shape, color, transform, None)
    }

    /// Creates a node parented to `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        shape: Shape,
        color: Vec3,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::MissingNode(parent));
        }
        let id = self.insert(name.into(), shape, color, transform, Some(parent));
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn insert(
        &mut self,
        name: String,
        shape: Shape,
        color: Vec3,
        transform: Transform,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                name,
                shape,
                color,
                transform,
                visible: true,
                parent,
                children: Vec::new(),
            },
        );
        id
    }

    /// Removes a node together with its descendants.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.remove(&id) else {
            return false;
        };
        if let Some(parent) = node.parent.and_then(|parent| self.nodes.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }
        let mut pending = node.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.nodes.remove(&child) {
                pending.extend(removed.children);
            }
        }
        true
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    /// Applies a mutation to the requested node.
    pub fn update<F, R>(&mut self, id: NodeId, updater: F) -> Option<R>
    where
        F: FnOnce(&mut SceneNode) -> R,
    {
        self.nodes.get_mut(&id).map(updater)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        self.update(id, |node| node.transform = transform).is_some()
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        self.update(id, |node| node.transform.translation = position)
            .is_some()
    }

    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> bool {
        self.update(id, |node| node.transform.rotation = rotation)
            .is_some()
    }

    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> bool {
        self.update(id, |node| node.transform.scale = scale).is_some()
    }

    pub fn set_color(&mut self, id: NodeId, color: Vec3) -> bool {
        self.update(id, |node| node.color = color).is_some()
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        self.update(id, |node| node.visible = visible).is_some()
    }

    /// Local-to-world matrix following the parent chain.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// True when the node and all of its ancestors are visible.
    pub fn is_visible_in_world(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(id) = current {
            match self.nodes.get(&id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// World bounds of every drawable node in the subtree rooted at `id`.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            pending.extend(node.children.iter().copied());
            let Some(local) = node.shape.local_bounds() else {
                continue;
            };
            let Some(matrix) = self.world_matrix(current) else {
                continue;
            };
            let world = local.transformed(&matrix);
            bounds = Some(match bounds {
                Some(existing) => existing.union(&world),
                None => world,
            });
        }
        bounds
    }

    /// Visible drawable nodes resolved to world space.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.shape.is_drawable())
            .filter(|(id, _)| self.is_visible_in_world(**id))
            .filter_map(|(id, node)| {
                self.world_matrix(*id).map(|model| DrawItem {
                    shape: node.shape,
                    color: node.color,
                    model,
                })
            })
            .collect()
    }
}
