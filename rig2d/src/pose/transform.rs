use std::collections::HashMap;

use glam::Vec2;

use crate::{Bone, BoneId, WorldTransform};

/// Composes every bone's local transform with its ancestor chain.
///
/// Pure read of the bone list. Bones may appear in any order; ancestors are
/// resolved on demand and memoized so each bone is composed exactly once per
/// pass. A root bone's world transform equals its local transform.
pub fn resolve_world(bones: &[Bone]) -> HashMap<BoneId, WorldTransform> {
    let index: HashMap<BoneId, usize> = bones.iter().enumerate().map(|(i, b)| (b.id, i)).collect();
    let mut resolved = HashMap::with_capacity(bones.len());
    for bone in bones {
        resolve_one(bone.id, bones, &index, &mut resolved, bones.len());
    }
    resolved
}

fn resolve_one(
    id: BoneId,
    bones: &[Bone],
    index: &HashMap<BoneId, usize>,
    resolved: &mut HashMap<BoneId, WorldTransform>,
    budget: usize,
) -> WorldTransform {
    if let Some(world) = resolved.get(&id) {
        return *world;
    }
    let bone = &bones[index[&id]];

    let local = WorldTransform {
        x: bone.x,
        y: bone.y,
        rotation: bone.rotation,
        scale_x: bone.scale_x,
        scale_y: bone.scale_y,
    };

    // `budget` bounds the ancestor walk so a malformed parent cycle (which
    // skeleton ops prevent) degrades to treating the bone as a root instead
    // of recursing forever.
    let world = match bone.parent.filter(|p| index.contains_key(p)) {
        Some(parent) if budget > 0 => {
            let parent = resolve_one(parent, bones, index, resolved, budget - 1);
            let offset = Vec2::from_angle(parent.rotation.to_radians())
                .rotate(Vec2::new(local.x * parent.scale_x, local.y * parent.scale_y));
            WorldTransform {
                x: parent.x + offset.x,
                y: parent.y + offset.y,
                rotation: parent.rotation + local.rotation,
                scale_x: parent.scale_x * local.scale_x,
                scale_y: parent.scale_y * local.scale_y,
            }
        }
        _ => local,
    };

    resolved.insert(id, world);
    world
}
