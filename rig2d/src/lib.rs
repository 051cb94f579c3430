//! Auto-rigging and pose mathematics for 2D character animation.
//!
//! This crate is the rig-math core of a character-animation tool: it turns a
//! segmented silhouette into a posable hierarchical skeleton
//! ([`autorig::analyze`]) and drives that skeleton through time with
//! keyframed, interpolated, and inverse-kinematic posing ([`pose`]).
//!
//! The crate is decoder- and renderer-agnostic: images enter and leave as raw
//! RGBA8 buffers, and nothing here touches the UI, persistence, or the
//! segmentation service that produces the input mask.

#![forbid(unsafe_code)]

mod error;
mod model;
mod skeleton;

pub mod autorig;
pub mod pose;

pub use error::*;
pub use model::*;
pub use skeleton::*;
