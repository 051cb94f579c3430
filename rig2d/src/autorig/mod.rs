//! Auto-rig: derives a posable humanoid skeleton from an alpha mask.
//!
//! The analyzer decomposes the silhouette along its principal axis, profiles
//! cross-sectional width, extracts anatomical landmarks, and converts them
//! into a fixed 11-segment bone tree plus optional per-limb attachment
//! crops. It runs once per rig-creation request, synchronously, over a fully
//! decoded raster; acquiring that raster (segmentation call, file decode) is
//! the caller's concern.

mod attachment;
mod bones;
mod landmarks;
mod moments;
mod profile;

pub(crate) use landmarks::{MaskLayout, Segment};

use crate::{Error, Rgba8Image};

/// Alpha values at or above this count as silhouette by default.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 24;

#[derive(Clone, Debug)]
pub struct AutoRigOptions {
    /// Skeleton name carried through to the result.
    pub name: String,
    pub alpha_threshold: u8,
    /// Also slice per-bone attachment crops out of the source image.
    pub build_attachments: bool,
}

impl Default for AutoRigOptions {
    fn default() -> Self {
        Self {
            name: "character".to_string(),
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            build_attachments: true,
        }
    }
}

/// One derived bone, keyed by a stable string; `parent_key` references are
/// resolved into concrete ids by the caller (see
/// [`crate::Skeleton::from_auto_rig`]). Local transform is relative to the
/// parent's start point and world rotation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoRigBone {
    pub key: &'static str,
    pub parent_key: Option<&'static str>,
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub length: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// An image crop positioned in its owning bone's local frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoRigAttachment {
    pub bone_key: &'static str,
    pub image: Rgba8Image,
    pub width: u32,
    pub height: u32,
    /// Crop center relative to the bone origin, in the bone's local frame.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Degrees, relative to the bone.
    pub rotation: f32,
    pub scale: f32,
}

/// Analyzer output: a fixed-topology bone list, optional attachment crops,
/// and non-fatal warnings.
#[derive(Clone, Debug)]
pub struct AutoRig {
    pub name: String,
    /// Source raster dimensions.
    pub width: u32,
    pub height: u32,
    /// The segmented image the rig was derived from.
    pub image: Rgba8Image,
    /// Parent-first ordered; always exactly 11 bones.
    pub bones: Vec<AutoRigBone>,
    pub attachments: Vec<AutoRigAttachment>,
    pub warnings: Vec<String>,
}

/// Derives a humanoid rig from `image`'s alpha channel.
///
/// Fails with [`Error::InsufficientSilhouette`] when the mask has fewer than
/// 100 opaque pixels or fewer than 10 populated cross-sectional bins; no
/// partial skeleton is returned. Degenerate attachment crops are skipped
/// with a warning instead.
pub fn analyze(image: &Rgba8Image, options: &AutoRigOptions) -> Result<AutoRig, Error> {
    let pixels = moments::collect_opaque(image, options.alpha_threshold);
    let frame = moments::analyze_frame(&pixels)?;
    let profile = profile::build(&pixels, &frame)?;
    let layout = landmarks::extract(&frame, &profile);
    log::debug!(
        "rig '{}': centroid {:?}, major axis {:?}, span {:.1}px",
        options.name,
        layout.frame.centroid,
        layout.frame.axis,
        layout.span,
    );
    let bones = bones::layout_to_bones(&layout);

    let mut warnings = Vec::new();
    let attachments = if options.build_attachments {
        attachment::slice(image, options.alpha_threshold, &layout, &mut warnings)
    } else {
        Vec::new()
    };

    Ok(AutoRig {
        name: options.name.clone(),
        width: image.width,
        height: image.height,
        image: image.clone(),
        bones,
        attachments,
        warnings,
    })
}


#[cfg(test)]
mod attachment_tests;
