//! Pose queries over plain bone data: world-transform resolution, two-bone
//! inverse kinematics, and keyframe interpolation.
//!
//! Everything here is a synchronous, deterministic transform of the data it
//! is given. Functions taking `&mut [Bone]` mutate the arena in place; the
//! caller serializes pose updates per skeleton.

mod ik;
mod timeline;
mod transform;

pub use ik::*;
pub use timeline::*;
pub use transform::*;

/// Normalizes `degrees` to (-180, 180].
pub(crate) fn shortest_rotation(mut degrees: f32) -> f32 {
    degrees = degrees.rem_euclid(360.0);
    if degrees > 180.0 {
        degrees -= 360.0;
    }
    degrees
}

#[cfg(test)]
mod transform_tests;

#[cfg(test)]
mod ik_tests;
