use glam::Vec3;

use crate::aabb::Aabb;
use crate::props::{Prop, PropKind};

/// Tolerance used when deciding whether a body came from above a surface.
const LANDING_EPSILON: f32 = 0.05;

/// Body moved with per-frame arithmetic and resolved against props.
///
/// `position` is the centre of the feet; the box extends `half_extents.y * 2`
/// upwards from there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub half_extents: Vec3,
    pub grounded: bool,
}

/// What happened during a single [`KinematicBody::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Index of the walkable prop the body landed on this frame.
    pub landed_on: Option<usize>,
    pub bounced: bool,
    /// Indices of floor pads the body is standing on.
    pub pads: Vec<usize>,
    pub blocked: bool,
}

impl KinematicBody {
    pub fn new(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            half_extents,
            grounded: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        bounds_at(self.position, self.half_extents)
    }

    /// Integrates one frame: gravity, ground and walkway landing, trampoline
    /// bounce, solid push-out, and the arena fence.
    pub fn step(
        &mut self,
        dt: f32,
        gravity: f32,
        bounce_speed: f32,
        props: &[Prop],
        arena_size: f32,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        let previous = self.position;

        self.velocity.y -= gravity * dt;
        self.position += self.velocity * dt;
        self.grounded = false;

        if self.position.y <= 0.0 {
            self.position.y = 0.0;
            self.velocity.y = self.velocity.y.max(0.0);
            self.grounded = true;
        }

        for (index, prop) in props.iter().enumerate() {
            if !prop.is_walkable() {
                continue;
            }
            let top = prop.bounds.max.y;
            let footprint = self.bounds();
            if !footprint.overlaps_xz(&prop.bounds) {
                continue;
            }
            let was_above = previous.y >= top - LANDING_EPSILON;
            let is_below = self.position.y <= top;
            if was_above && is_below && self.velocity.y <= 0.0 {
                self.position.y = top;
                self.velocity.y = 0.0;
                self.grounded = true;
                outcome.landed_on = Some(index);
                if prop.kind == PropKind::Trampoline {
                    self.velocity.y = bounce_speed;
                    self.grounded = false;
                    outcome.bounced = true;
                }
            }
        }

        for prop in props.iter() {
            if !(prop.is_solid() || (prop.is_walkable() && self.position.y < prop.bounds.max.y)) {
                continue;
            }
            if let Some(push) = self.bounds().penetration_xz(&prop.bounds) {
                self.position += push;
                if push.x != 0.0 {
                    self.velocity.x = 0.0;
                }
                if push.z != 0.0 {
                    self.velocity.z = 0.0;
                }
                outcome.blocked = true;
            }
        }

        let limit = (arena_size - self.half_extents.x.max(self.half_extents.z)).max(0.0);
        self.position.x = self.position.x.clamp(-limit, limit);
        self.position.z = self.position.z.clamp(-limit, limit);

        let feet = self.bounds();
        for (index, prop) in props.iter().enumerate() {
            if prop.kind == PropKind::ColorSelector
                && self.grounded
                && feet.overlaps_xz(&prop.bounds)
                && self.position.y <= prop.bounds.max.y + LANDING_EPSILON
            {
                outcome.pads.push(index);
            }
        }

        outcome
    }
}

/// Box for a body whose feet sit at `position`.
pub fn bounds_at(position: Vec3, half_extents: Vec3) -> Aabb {
    Aabb::from_center_half_extents(position + Vec3::Y * half_extents.y, half_extents)
}

/// Pushes a ground-bound body (zombies) out of solid props.
pub fn push_out_of_solids(position: Vec3, half_extents: Vec3, props: &[Prop]) -> Vec3 {
    let mut position = position;
    for prop in props.iter().filter(|prop| prop.is_solid() || prop.is_walkable()) {
        if let Some(push) = bounds_at(position, half_extents).penetration_xz(&prop.bounds) {
            position += push;
        }
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::PropSpec;
    use crate::scene::SceneGraph;

    const HALF: Vec3 = Vec3::new(0.4, 0.5, 0.4);

    fn spawn(kind: PropKind, position: Vec3) -> Prop {
        let mut scene = SceneGraph::new();
        Prop::spawn(&mut scene, &PropSpec::new("prop", kind, position)).unwrap()
    }

    #[test]
    fn falls_to_the_ground() {
        let mut body = KinematicBody::new(Vec3::new(0.0, 3.0, 0.0), HALF);
        for _ in 0..120 {
            body.step(1.0 / 60.0, 25.0, 18.0, &[], 40.0);
        }
        assert_eq!(body.position.y, 0.0);
        assert!(body.grounded);
    }

    #[test]
    fn lands_on_walkway_from_above() {
        let walkway = spawn(PropKind::Walkway, Vec3::ZERO);
        let top = walkway.bounds.max.y;
        let mut body = KinematicBody::new(Vec3::new(0.0, top + 1.0, 0.0), HALF);
        let mut landed = false;
        for _ in 0..60 {
            let outcome = body.step(1.0 / 60.0, 25.0, 18.0, std::slice::from_ref(&walkway), 40.0);
            landed |= outcome.landed_on == Some(0);
        }
        assert!(landed);
        assert!((body.position.y - top).abs() < 1e-5);
        assert!(body.grounded);
    }

    #[test]
    fn walking_into_walkway_side_is_blocked() {
        let walkway = spawn(PropKind::Walkway, Vec3::ZERO);
        let mut body = KinematicBody::new(Vec3::new(-3.0, 0.0, 0.0), HALF);
        body.velocity.x = 8.0;
        for _ in 0..60 {
            body.step(1.0 / 60.0, 25.0, 18.0, std::slice::from_ref(&walkway), 40.0);
        }
        assert!(body.bounds().max.x <= walkway.bounds.min.x + 1e-3);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn trampoline_bounces() {
        let trampoline = spawn(PropKind::Trampoline, Vec3::ZERO);
        let mut body = KinematicBody::new(Vec3::new(0.0, 2.0, 0.0), HALF);
        let mut bounced = false;
        for _ in 0..60 {
            let outcome = body.step(1.0 / 60.0, 25.0, 18.0, std::slice::from_ref(&trampoline), 40.0);
            if outcome.bounced {
                bounced = true;
                assert_eq!(body.velocity.y, 18.0);
                break;
            }
        }
        assert!(bounced);
    }

    #[test]
    fn solid_props_push_bodies_out() {
        let rock = spawn(PropKind::Rock, Vec3::new(2.0, 0.0, 0.0));
        let mut body = KinematicBody::new(Vec3::ZERO, HALF);
        body.velocity.x = 10.0;
        let mut blocked = false;
        for _ in 0..30 {
            blocked |= body
                .step(1.0 / 60.0, 25.0, 18.0, std::slice::from_ref(&rock), 40.0)
                .blocked;
        }
        assert!(blocked);
        assert!(!body.bounds().expand(-1e-3).intersects(&rock.bounds));
    }

    #[test]
    fn arena_fence_clamps_position() {
        let mut body = KinematicBody::new(Vec3::ZERO, HALF);
        body.velocity = Vec3::new(1000.0, 0.0, -1000.0);
        body.step(1.0, 25.0, 18.0, &[], 10.0);
        assert!((body.position.x - 9.6).abs() < 1e-4);
        assert!((body.position.z + 9.6).abs() < 1e-4);
    }

    #[test]
    fn arena_narrower_than_the_body_pins_it_to_the_center() {
        let mut body = KinematicBody::new(Vec3::new(0.2, 0.0, -0.2), HALF);
        body.velocity = Vec3::new(5.0, 0.0, 5.0);
        body.step(1.0 / 60.0, 25.0, 18.0, &[], 0.3);
        assert_eq!(body.position.x, 0.0);
        assert_eq!(body.position.z, 0.0);
    }

    #[test]
    fn color_pads_are_reported() {
        let pad = spawn(PropKind::ColorSelector, Vec3::ZERO);
        let mut body = KinematicBody::new(Vec3::ZERO, HALF);
        let outcome = body.step(1.0 / 60.0, 25.0, 18.0, std::slice::from_ref(&pad), 40.0);
        assert_eq!(outcome.pads, vec![0]);
    }
}
