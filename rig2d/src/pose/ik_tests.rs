use glam::Vec2;

use crate::{Bone, Error, IkConstraint};

use super::{apply_all_constraints, apply_constraint, resolve_world, solve_two_bone};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-3,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

/// Two-bone chain: parent at the origin, child offset by the parent's
/// length, both 50 units long.
fn chain() -> Vec<Bone> {
    let mut parent = Bone::new(1, "parent", None);
    parent.length = 50.0;
    let mut child = Bone::new(2, "child", Some(1));
    child.x = 50.0;
    child.length = 50.0;
    vec![parent, child]
}

fn chain_tip(bones: &[Bone]) -> Vec2 {
    let world = resolve_world(bones);
    let child = &world[&2];
    child_tip(child.x, child.y, child.rotation, 50.0)
}

fn child_tip(x: f32, y: f32, rotation: f32, length: f32) -> Vec2 {
    Vec2::new(x, y) + Vec2::from_angle(rotation.to_radians()) * length
}

#[test]
fn fully_extended_target_is_reachable() {
    let solution = solve_two_bone(50.0, 50.0, Vec2::ZERO, Vec2::new(100.0, 0.0), true);
    assert!(solution.reachable);
    assert_approx(solution.parent_rotation, 0.0);
    assert_approx(solution.child_rotation, 0.0);
}

#[test]
fn distant_target_clamps_to_full_extension() {
    let solution = solve_two_bone(50.0, 50.0, Vec2::ZERO, Vec2::new(1000.0, 0.0), true);
    assert!(!solution.reachable);
    assert!(solution.parent_rotation.is_finite());
    assert!(solution.child_rotation.is_finite());
    // Clamping lands on the annulus boundary exactly: a fully extended,
    // perfectly straight chain, no residual bend.
    assert_approx(solution.parent_rotation, 0.0);
    assert_approx(solution.child_rotation, 0.0);
}

#[test]
fn clamped_overreach_points_straight_at_the_target() {
    let target = Vec2::new(700.0, 700.0);
    let solution = solve_two_bone(50.0, 50.0, Vec2::ZERO, target, true);
    assert!(!solution.reachable);
    assert_approx(solution.parent_rotation, 45.0);
    assert_approx(solution.child_rotation, 0.0);
}

#[test]
fn target_at_the_origin_with_equal_lengths_stays_finite() {
    // min reach is zero, so the distance degenerates entirely.
    let solution = solve_two_bone(50.0, 50.0, Vec2::ZERO, Vec2::ZERO, true);
    assert!(solution.parent_rotation.is_finite());
    assert!(solution.child_rotation.is_finite());
}

#[test]
fn target_inside_inner_annulus_is_unreachable_but_finite() {
    // |a - b| = 20, target at distance 5.
    let solution = solve_two_bone(50.0, 30.0, Vec2::ZERO, Vec2::new(5.0, 0.0), true);
    assert!(!solution.reachable);
    assert!(solution.parent_rotation.is_finite());
    assert!(solution.child_rotation.is_finite());
}

#[test]
fn bend_direction_mirrors_both_angles() {
    let target = Vec2::new(60.0, 40.0);
    let positive = solve_two_bone(50.0, 50.0, Vec2::ZERO, target, true);
    let negative = solve_two_bone(50.0, 50.0, Vec2::ZERO, target, false);

    let theta = target.y.atan2(target.x).to_degrees();
    assert_approx(positive.parent_rotation - theta, theta - negative.parent_rotation);
    assert_approx(positive.child_rotation, -negative.child_rotation);
}

#[test]
fn applied_constraint_places_chain_end_on_target() {
    let mut bones = chain();
    let mut constraint = IkConstraint::new(0, "reach", 2);
    constraint.target_x = 50.0;
    constraint.target_y = 50.0;

    apply_constraint(&mut bones, &constraint).unwrap();
    let tip = chain_tip(&bones);
    assert_approx(tip.x, 50.0);
    assert_approx(tip.y, 50.0);
}

#[test]
fn zero_mix_leaves_bones_bit_identical() {
    let mut bones = chain();
    bones[0].rotation = 17.25;
    bones[1].rotation = -4.5;
    let before = bones.clone();

    let mut constraint = IkConstraint::new(0, "idle", 2);
    constraint.target_x = 10.0;
    constraint.target_y = 90.0;
    constraint.mix = 0.0;

    apply_all_constraints(&mut bones, &[constraint]);
    assert_eq!(bones, before);
}

#[test]
fn half_mix_blends_halfway_to_solution() {
    let mut bones = chain();
    let target = Vec2::new(50.0, 50.0);
    let solution = solve_two_bone(50.0, 50.0, Vec2::ZERO, target, true);

    let mut constraint = IkConstraint::new(0, "half", 2);
    constraint.target_x = target.x;
    constraint.target_y = target.y;
    constraint.mix = 0.5;

    apply_constraint(&mut bones, &constraint).unwrap();
    assert_approx(bones[0].rotation, solution.parent_rotation * 0.5);
    assert_approx(bones[1].rotation, solution.child_rotation * 0.5);
}

#[test]
fn disabled_constraint_is_a_no_op() {
    let mut bones = chain();
    let before = bones.clone();
    let mut constraint = IkConstraint::new(0, "off", 2);
    constraint.target_y = 75.0;
    constraint.enabled = false;

    apply_constraint(&mut bones, &constraint).unwrap();
    assert_eq!(bones, before);
}

#[test]
fn chain_length_other_than_two_is_refused() {
    let mut bones = chain();
    let before = bones.clone();
    let mut constraint = IkConstraint::new(0, "long", 2);
    constraint.chain_length = 3;
    constraint.target_x = 40.0;

    let err = apply_constraint(&mut bones, &constraint).unwrap_err();
    assert!(matches!(err, Error::UnsupportedIkChain { length: 3 }));
    assert_eq!(bones, before);
}

#[test]
fn parentless_target_bone_is_refused() {
    let mut lone = Bone::new(7, "lone", None);
    lone.length = 10.0;
    let mut bones = vec![lone];
    let constraint = IkConstraint::new(0, "dangling", 7);

    let err = apply_constraint(&mut bones, &constraint).unwrap_err();
    assert!(matches!(err, Error::IkChainTooShort { .. }));
}

#[test]
fn batch_application_skips_refused_constraints() {
    let mut bones = chain();
    let mut bad = IkConstraint::new(0, "bad", 2);
    bad.chain_length = 5;
    bad.target_x = -40.0;
    let mut good = IkConstraint::new(1, "good", 2);
    good.target_x = 50.0;
    good.target_y = 50.0;

    apply_all_constraints(&mut bones, &[bad, good]);
    let tip = chain_tip(&bones);
    assert_approx(tip.x, 50.0);
    assert_approx(tip.y, 50.0);
}

#[test]
fn constraints_apply_sequentially_in_list_order() {
    // Same chain, two targets: the later constraint wins because it sees
    // (and overrides) the state the first one left behind.
    let mut bones = chain();
    let mut first = IkConstraint::new(0, "first", 2);
    first.target_x = 0.0;
    first.target_y = 100.0;
    let mut second = IkConstraint::new(1, "second", 2);
    second.target_x = 100.0;
    second.target_y = 0.0;

    apply_all_constraints(&mut bones, &[first, second]);
    let tip = chain_tip(&bones);
    assert_approx(tip.x, 100.0);
    assert_approx(tip.y, 0.0);
}

#[test]
fn scaled_parent_lengths_extend_reach() {
    let mut bones = chain();
    bones[0].scale_x = 2.0;
    // Effective lengths 100 + 100: a target at 150 is comfortably reachable.
    let mut constraint = IkConstraint::new(0, "scaled", 2);
    constraint.target_x = 150.0;

    apply_constraint(&mut bones, &constraint).unwrap();
    let world = resolve_world(&bones);
    let child = &world[&2];
    let tip = child_tip(child.x, child.y, child.rotation, 50.0 * child.scale_x);
    assert_approx(tip.x, 150.0);
    assert_approx(tip.y, 0.0);
}
