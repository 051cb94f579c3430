use crate::Bone;

use super::resolve_world;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-3,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn bone(id: u32, parent: Option<u32>, x: f32, y: f32) -> Bone {
    let mut b = Bone::new(id, format!("b{id}"), parent);
    b.x = x;
    b.y = y;
    b
}

#[test]
fn root_world_transform_equals_local() {
    let mut root = bone(0, None, 12.5, -3.0);
    root.rotation = 42.0;
    root.scale_x = 1.5;
    root.scale_y = 0.5;

    let world = resolve_world(&[root.clone()]);
    let w = &world[&0];
    assert_eq!(w.x, root.x);
    assert_eq!(w.y, root.y);
    assert_eq!(w.rotation, root.rotation);
    assert_eq!(w.scale_x, root.scale_x);
    assert_eq!(w.scale_y, root.scale_y);
}

#[test]
fn unrotated_chain_sums_translations() {
    let bones = vec![
        bone(0, None, 10.0, 20.0),
        bone(1, Some(0), 5.0, 5.0),
        bone(2, Some(1), 1.0, 2.0),
    ];
    let world = resolve_world(&bones);
    assert_approx(world[&2].x, 16.0);
    assert_approx(world[&2].y, 27.0);
    assert_approx(world[&2].rotation, 0.0);
}

#[test]
fn resolves_regardless_of_bone_order() {
    // Children listed before their ancestors; on-demand resolution must not
    // care.
    let bones = vec![
        bone(2, Some(1), 1.0, 2.0),
        bone(1, Some(0), 5.0, 5.0),
        bone(0, None, 10.0, 20.0),
    ];
    let world = resolve_world(&bones);
    assert_approx(world[&2].x, 16.0);
    assert_approx(world[&2].y, 27.0);
}

#[test]
fn parent_rotation_and_scale_transform_child_offset() {
    let mut root = bone(0, None, 0.0, 0.0);
    root.rotation = 90.0;
    root.scale_x = 2.0;
    let child = bone(1, Some(0), 1.0, 0.0);

    let world = resolve_world(&[root, child]);
    let w = &world[&1];
    // Local (1,0) scaled to (2,0), rotated 90 degrees -> (0,2).
    assert_approx(w.x, 0.0);
    assert_approx(w.y, 2.0);
    assert_approx(w.rotation, 90.0);
    assert_approx(w.scale_x, 2.0);
    assert_approx(w.scale_y, 1.0);
}

#[test]
fn world_rotations_accumulate_down_the_chain() {
    let mut a = bone(0, None, 0.0, 0.0);
    a.rotation = 30.0;
    let mut b = bone(1, Some(0), 0.0, 0.0);
    b.rotation = 45.0;
    let mut c = bone(2, Some(1), 0.0, 0.0);
    c.rotation = -15.0;

    let world = resolve_world(&[a, b, c]);
    assert_approx(world[&2].rotation, 60.0);
}

#[test]
fn missing_parent_is_treated_as_root() {
    let orphan = bone(5, Some(99), 3.0, 4.0);
    let world = resolve_world(&[orphan]);
    assert_approx(world[&5].x, 3.0);
    assert_approx(world[&5].y, 4.0);
}
