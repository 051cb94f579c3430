use std::f32::consts::PI;

use glam::Vec2;

use crate::{Bone, Error, IkConstraint};

use super::{resolve_world, shortest_rotation};

/// Floor for segment lengths and target distance so the law-of-cosines
/// denominators never vanish.
const LENGTH_EPSILON: f32 = 1.0e-4;

/// Rotations that place a two-bone chain's end at (or as near as possible to)
/// the target. Angles are degrees; `parent_rotation` is world-absolute,
/// `child_rotation` is relative to the parent segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IkSolution {
    pub parent_rotation: f32,
    pub child_rotation: f32,
    pub reachable: bool,
}

/// Analytic two-bone IK via the law of cosines.
///
/// When the target lies outside the reachable annulus `[|a-b|, a+b]` the
/// distance is clamped to the nearest bound and `reachable` is false, but a
/// best-effort pose is still produced. Never panics, always finite.
pub fn solve_two_bone(
    parent_length: f32,
    child_length: f32,
    origin: Vec2,
    target: Vec2,
    bend_positive: bool,
) -> IkSolution {
    let a = parent_length.max(LENGTH_EPSILON);
    let b = child_length.max(LENGTH_EPSILON);

    let delta = target - origin;
    let theta = delta.y.atan2(delta.x);
    let mut d = delta.length();
    let mut reachable = true;

    // Clamp to the exact annulus bounds; the cosine clamps below keep acos
    // well-defined at full extension and full fold.
    let max_reach = a + b;
    let min_reach = (a - b).abs();
    if d > max_reach {
        d = max_reach;
        reachable = false;
    } else if d < min_reach {
        d = min_reach;
        reachable = false;
    }
    let d = d.max(LENGTH_EPSILON);

    let cos_parent = ((a * a + d * d - b * b) / (2.0 * a * d)).clamp(-1.0, 1.0);
    let cos_child = ((a * a + b * b - d * d) / (2.0 * a * b)).clamp(-1.0, 1.0);
    let at_parent = cos_parent.acos();
    let at_child = cos_child.acos();

    let (parent, child) = if bend_positive {
        (theta + at_parent, -(PI - at_child))
    } else {
        (theta - at_parent, PI - at_child)
    };

    IkSolution {
        parent_rotation: parent.to_degrees(),
        child_rotation: child.to_degrees(),
        reachable,
    }
}

/// Applies one IK constraint to the bone arena in place.
///
/// The chain is the constraint's target bone plus its immediate parent, and
/// nothing else: other chain lengths are refused with the bones untouched.
/// Each bone's rotation is blended toward the solved rotation by the
/// constraint's `mix` along the shortest angular path, so partial influence
/// is supported; `mix = 0` or a disabled constraint leaves the arena
/// bit-identical.
pub fn apply_constraint(bones: &mut [Bone], constraint: &IkConstraint) -> Result<(), Error> {
    if constraint.chain_length != 2 {
        return Err(Error::UnsupportedIkChain {
            length: constraint.chain_length,
        });
    }
    let child_index = bones
        .iter()
        .position(|b| b.id == constraint.target_bone)
        .ok_or(Error::UnknownBone {
            id: constraint.target_bone,
        })?;
    let parent_id = bones[child_index]
        .parent
        .ok_or_else(|| Error::IkChainTooShort {
            bone: bones[child_index].name.clone(),
        })?;
    let parent_index = bones
        .iter()
        .position(|b| b.id == parent_id)
        .ok_or(Error::UnknownBone { id: parent_id })?;

    if !constraint.enabled || constraint.mix <= 0.0 {
        return Ok(());
    }

    let world = resolve_world(bones);
    let parent_world = world[&parent_id];
    let child_world = world[&constraint.target_bone];
    let grandparent_rotation = bones[parent_index]
        .parent
        .and_then(|gp| world.get(&gp))
        .map(|w| w.rotation)
        .unwrap_or(0.0);

    let solution = solve_two_bone(
        bones[parent_index].length * parent_world.scale_x,
        bones[child_index].length * child_world.scale_x,
        Vec2::new(parent_world.x, parent_world.y),
        Vec2::new(constraint.target_x, constraint.target_y),
        constraint.bend_positive,
    );

    let mix = constraint.mix.min(1.0);
    let parent_target = solution.parent_rotation - grandparent_rotation;
    let child_target = solution.child_rotation;

    let parent_bone = &mut bones[parent_index];
    parent_bone.rotation += shortest_rotation(parent_target - parent_bone.rotation) * mix;
    let child_bone = &mut bones[child_index];
    child_bone.rotation += shortest_rotation(child_target - child_bone.rotation) * mix;

    Ok(())
}

/// Applies every enabled constraint sequentially, in list order.
///
/// Later constraints see the bone state left by earlier ones. Constraints
/// that would be refused (unsupported chain, missing bones) are skipped with
/// a warning so a batch pose update never aborts mid-edit.
pub fn apply_all_constraints(bones: &mut [Bone], constraints: &[IkConstraint]) {
    for constraint in constraints {
        if !constraint.enabled {
            continue;
        }
        if let Err(err) = apply_constraint(bones, constraint) {
            log::warn!("skipping IK constraint '{}': {err}", constraint.name);
        }
    }
}
