//! Attachment slicing: capsule masks intersected with the segmented source.

use glam::Vec2;

use crate::Rgba8Image;
use crate::pose::shortest_rotation;

use super::{AutoRigAttachment, MaskLayout, Segment};

// Capsule radii as fractions of body span / measured row widths.
const ARM_RADIUS_RATIO: f32 = 0.05;
const LEG_RADIUS_RATIO: f32 = 0.06;
const MIN_RADIUS_RATIO: f32 = 0.02;
const SPINE_WIDTH_SCALE: f32 = 0.8;
const HEAD_CAPSULE_RATIO: f32 = 0.35;
const HEAD_CIRCLE_RATIO: f32 = 0.55;

enum Shape {
    Capsule { a: Vec2, b: Vec2, radius: f32 },
    Circle { center: Vec2, radius: f32 },
}

impl Shape {
    fn contains(&self, p: Vec2) -> bool {
        match *self {
            Shape::Capsule { a, b, radius } => segment_distance(p, a, b) <= radius,
            Shape::Circle { center, radius } => p.distance(center) <= radius,
        }
    }

    fn bounds(&self) -> (Vec2, Vec2) {
        match *self {
            Shape::Capsule { a, b, radius } => {
                (a.min(b) - Vec2::splat(radius), a.max(b) + Vec2::splat(radius))
            }
            Shape::Circle { center, radius } => {
                (center - Vec2::splat(radius), center + Vec2::splat(radius))
            }
        }
    }
}

/// Cuts one crop per segment out of the segmented source image.
///
/// Bones are created regardless; a capsule that captures zero opaque pixels
/// only surfaces a warning and is skipped.
pub(crate) fn slice(
    image: &Rgba8Image,
    threshold: u8,
    layout: &MaskLayout,
    warnings: &mut Vec<String>,
) -> Vec<AutoRigAttachment> {
    let mut attachments = Vec::with_capacity(layout.segments.len());
    for segment in &layout.segments {
        let shapes = shapes_for(segment, layout);
        match crop(image, threshold, segment, &shapes) {
            Some(attachment) => attachments.push(attachment),
            None => {
                let message = format!(
                    "attachment '{}' captured no opaque pixels; skipped",
                    segment.key
                );
                log::warn!("{message}");
                warnings.push(message);
            }
        }
    }
    attachments
}

/// Torso and head are unions of a capsule and a circle sized from the
/// measured shoulder/hip rows; limbs and spine are plain capsules. The torso
/// capsule runs between the measured pelvis and chest joints so it covers
/// the anatomy even when minimum-length enforcement stretched the segment.
fn shapes_for(segment: &Segment, layout: &MaskLayout) -> Vec<Shape> {
    let min_radius = MIN_RADIUS_RATIO * layout.span;
    let capsule = |radius: f32| Shape::Capsule {
        a: segment.start,
        b: segment.end,
        radius: radius.max(min_radius),
    };
    match segment.key {
        "root" => vec![
            Shape::Capsule {
                a: layout.joints.pelvis,
                b: layout.joints.chest,
                radius: layout.hip_half_width.max(min_radius),
            },
            Shape::Circle {
                center: layout.joints.chest,
                radius: layout.shoulder_half_width.max(min_radius),
            },
        ],
        "spine" => vec![capsule(layout.shoulder_half_width * SPINE_WIDTH_SCALE)],
        "head" => {
            let length = segment.length();
            vec![
                capsule(length * HEAD_CAPSULE_RATIO),
                Shape::Circle {
                    center: segment.start.lerp(segment.end, 0.5),
                    radius: (length * HEAD_CIRCLE_RATIO).max(min_radius),
                },
            ]
        }
        key if key.contains("arm") => vec![capsule(ARM_RADIUS_RATIO * layout.span)],
        _ => vec![capsule(LEG_RADIUS_RATIO * layout.span)],
    }
}

fn crop(
    image: &Rgba8Image,
    threshold: u8,
    segment: &Segment,
    shapes: &[Shape],
) -> Option<AutoRigAttachment> {
    // Scan window: union of shape bounds, clamped to the image.
    let mut lo = Vec2::splat(f32::MAX);
    let mut hi = Vec2::splat(f32::MIN);
    for shape in shapes {
        let (a, b) = shape.bounds();
        lo = lo.min(a);
        hi = hi.max(b);
    }
    let x0 = (lo.x.floor().max(0.0)) as u32;
    let y0 = (lo.y.floor().max(0.0)) as u32;
    let x1 = (hi.x.ceil() as i64).clamp(0, image.width as i64) as u32;
    let y1 = (hi.y.ceil() as i64).clamp(0, image.height as i64) as u32;
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    // First pass: opaque bounding box of capsule ∩ silhouette.
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut any = false;
    for y in y0..y1 {
        for x in x0..x1 {
            if image.alpha_at(x, y) < threshold {
                continue;
            }
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if shapes.iter().any(|s| s.contains(center)) {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                any = true;
            }
        }
    }
    if !any {
        return None;
    }

    let width = max_x - min_x + 1;
    let height = max_y - min_y + 1;
    let mut out = Rgba8Image::new(width, height);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if image.alpha_at(x, y) < threshold {
                continue;
            }
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if shapes.iter().any(|s| s.contains(center)) {
                out.set_pixel(x - min_x, y - min_y, image.pixel_at(x, y));
            }
        }
    }

    // Crop center relative to the bone origin, expressed in the bone's
    // local frame by rotating through the negative segment angle.
    let angle = segment.angle_deg();
    let crop_center = Vec2::new(
        min_x as f32 + width as f32 * 0.5,
        min_y as f32 + height as f32 * 0.5,
    );
    let offset = Vec2::from_angle(-angle.to_radians()).rotate(crop_center - segment.start);

    Some(AutoRigAttachment {
        bone_key: segment.key,
        image: out,
        width,
        height,
        offset_x: offset.x,
        offset_y: offset.y,
        rotation: shortest_rotation(-angle),
        scale: 1.0,
    })
}

/// Distance from `p` to the closed segment `ab`.
fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
