use glam::Vec2;

use crate::Rgba8Image;

use super::{AutoRigOptions, analyze, attachment, landmarks, moments, profile};

fn fill_rect(image: &mut Rgba8Image, x0: u32, y0: u32, x1: u32, y1: u32) {
    for y in y0..y1 {
        for x in x0..x1 {
            image.set_pixel(x, y, [200, 180, 160, 255]);
        }
    }
}

fn humanoid() -> Rgba8Image {
    let mut image = Rgba8Image::new(200, 400);
    fill_rect(&mut image, 85, 20, 115, 60);
    fill_rect(&mut image, 80, 60, 120, 240);
    fill_rect(&mut image, 20, 110, 80, 130);
    fill_rect(&mut image, 120, 110, 180, 130);
    fill_rect(&mut image, 84, 240, 97, 380);
    fill_rect(&mut image, 103, 240, 116, 380);
    image
}

#[test]
fn every_attachment_belongs_to_a_bone_and_has_content() {
    let rig = analyze(&humanoid(), &AutoRigOptions::default()).unwrap();
    assert!(
        !rig.attachments.is_empty(),
        "a solid humanoid should produce attachment crops"
    );

    let keys: Vec<&str> = rig.bones.iter().map(|b| b.key).collect();
    for attachment in &rig.attachments {
        assert!(keys.contains(&attachment.bone_key));
        assert!(attachment.width > 0 && attachment.height > 0);
        assert_eq!(
            attachment.image.pixels.len(),
            attachment.width as usize * attachment.height as usize * 4
        );
        let opaque = attachment
            .image
            .pixels
            .chunks_exact(4)
            .filter(|px| px[3] > 0)
            .count();
        assert!(
            opaque > 0,
            "attachment '{}' has no opaque pixels",
            attachment.bone_key
        );
        assert_eq!(attachment.scale, 1.0);
    }
}

#[test]
fn torso_crop_stays_within_the_source_bounds() {
    let rig = analyze(&humanoid(), &AutoRigOptions::default()).unwrap();
    let torso = rig
        .attachments
        .iter()
        .find(|a| a.bone_key == "root")
        .expect("torso attachment");
    assert!(torso.width <= rig.width);
    assert!(torso.height <= rig.height);
}

#[test]
fn leg_crop_offset_is_expressed_in_the_bone_frame() {
    let rig = analyze(&humanoid(), &AutoRigOptions::default()).unwrap();
    let leg = rig
        .attachments
        .iter()
        .find(|a| a.bone_key == "upper_leg_l")
        .expect("left upper leg attachment");

    // The leg bone points down the leg; its crop center sits near the bone
    // axis, so the local offset is mostly longitudinal.
    assert!(
        leg.offset_y.abs() < leg.offset_x.abs() + 15.0,
        "offset ({}, {}) is not aligned with the bone",
        leg.offset_x,
        leg.offset_y
    );
    // Crop images are axis-aligned in source space; their rotation undoes
    // the bone's world angle.
    let leg_bone = rig.bones.iter().find(|b| b.key == "upper_leg_l").unwrap();
    assert!(leg_bone.length > 0.0);
    assert!(leg.rotation.abs() <= 180.0);
}

#[test]
fn torso_crop_covers_the_measured_pelvis_to_chest_extent() {
    let image = humanoid();
    let pixels = moments::collect_opaque(&image, 24);
    let frame = moments::analyze_frame(&pixels).unwrap();
    let width_profile = profile::build(&pixels, &frame).unwrap();
    let layout = landmarks::extract(&frame, &width_profile);

    let mut warnings = Vec::new();
    let attachments = attachment::slice(&image, 24, &layout, &mut warnings);
    let torso = attachments
        .iter()
        .find(|a| a.bone_key == "root")
        .expect("torso attachment");

    // The torso mask is anchored on the pelvis and chest joints, so the crop
    // must span at least that trunk distance vertically.
    let trunk = (layout.joints.chest - layout.joints.pelvis).length();
    assert!(
        torso.height as f32 >= trunk,
        "torso crop height {} shorter than pelvis-to-chest {}",
        torso.height,
        trunk
    );
}

#[test]
fn off_silhouette_segment_is_skipped_with_a_warning() {
    let image = humanoid();
    let pixels = moments::collect_opaque(&image, 24);
    let frame = moments::analyze_frame(&pixels).unwrap();
    let width_profile = profile::build(&pixels, &frame).unwrap();
    let mut layout = landmarks::extract(&frame, &width_profile);

    // Push one arm segment completely off the canvas.
    layout.segments[4].start = Vec2::new(1000.0, 1000.0);
    layout.segments[4].end = Vec2::new(1100.0, 1000.0);

    let mut warnings = Vec::new();
    let attachments = attachment::slice(&image, 24, &layout, &mut warnings);

    assert_eq!(warnings.len(), 1);
    assert!(
        warnings[0].contains("lower_arm_l"),
        "unexpected warning: {}",
        warnings[0]
    );
    assert!(attachments.iter().all(|a| a.bone_key != "lower_arm_l"));
    assert_eq!(attachments.len(), layout.segments.len() - 1);
}

#[test]
fn analyzer_surfaces_attachment_warnings_without_failing() {
    // A figure whose hands fall outside the silhouette: the fallback hand
    // placement may produce empty lower-arm crops, which must only warn.
    let mut image = Rgba8Image::new(60, 340);
    fill_rect(&mut image, 25, 20, 35, 320);

    let rig = analyze(&image, &AutoRigOptions::default()).unwrap();
    assert_eq!(rig.bones.len(), 11);
    // Warnings are advisory; every returned attachment is still valid.
    for attachment in &rig.attachments {
        assert!(attachment.width > 0 && attachment.height > 0);
    }
}
