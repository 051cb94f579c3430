//! Segment-to-bone conversion: fixed humanoid topology, parent-relative
//! local transforms.

use std::collections::HashMap;

use glam::Vec2;

use crate::pose::shortest_rotation;

use super::{AutoRigBone, MaskLayout};

/// Converts the layout's world-space segments into parent-relative bones.
///
/// Each bone's local offset is the world delta from its parent's start
/// point, rotated by the negative of the parent's world angle; its local
/// rotation is the world-angle difference. Edits to a parent therefore never
/// require recomputing children. Output order is parent-first.
pub(crate) fn layout_to_bones(layout: &MaskLayout) -> Vec<AutoRigBone> {
    // key -> (world start, world angle) of already-converted parents.
    let mut world: HashMap<&'static str, (Vec2, f32)> = HashMap::with_capacity(11);
    let mut bones = Vec::with_capacity(layout.segments.len());

    for segment in &layout.segments {
        let angle = segment.angle_deg();
        let length = segment.length();

        let (x, y, rotation) = match segment.parent.and_then(|p| world.get(p)) {
            Some(&(parent_start, parent_angle)) => {
                let local = Vec2::from_angle(-parent_angle.to_radians())
                    .rotate(segment.start - parent_start);
                (
                    local.x,
                    local.y,
                    shortest_rotation(angle - parent_angle),
                )
            }
            None => (segment.start.x, segment.start.y, angle),
        };

        world.insert(segment.key, (segment.start, angle));
        bones.push(AutoRigBone {
            key: segment.key,
            parent_key: segment.parent,
            x,
            y,
            rotation,
            length,
            scale_x: 1.0,
            scale_y: 1.0,
        });
    }

    bones
}
