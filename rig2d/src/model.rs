//! Plain-data rig model: bones, constraints, keyframes, animations, rasters.
//!
//! Everything here is inert data. Pose math lives in [`crate::pose`], rig
//! construction in [`crate::autorig`], and ownership/lifecycle in
//! [`crate::Skeleton`].

/// Identifier for a bone within one skeleton's arena.
pub type BoneId = u32;

/// Identifier for an IK constraint within one skeleton.
pub type ConstraintId = u32;

/// Identifier for an animation within one skeleton.
pub type AnimationId = u32;

/// A local rigid transform node in a parent-relative hierarchy.
///
/// Bones reference their parent by id, not by containment; the owning
/// [`crate::Skeleton`] keeps the parent graph a forest. Rotation is in
/// degrees, position in the parent's local frame.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    pub id: BoneId,
    pub name: String,
    pub parent: Option<BoneId>,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub length: f32,
    pub pivot_x: f32,
    pub pivot_y: f32,
}

impl Bone {
    pub fn new(id: BoneId, name: impl Into<String>, parent: Option<BoneId>) -> Self {
        Self {
            id,
            name: name.into(),
            parent,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            length: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
        }
    }
}

/// World-space pose of one bone after ancestor composition.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldTransform {
    pub x: f32,
    pub y: f32,
    /// Degrees.
    pub rotation: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// A two-bone IK constraint: the chain is always the target bone and its
/// immediate parent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct IkConstraint {
    pub id: ConstraintId,
    pub name: String,
    pub target_bone: BoneId,
    /// Fixed at 2; any other value is refused when applying.
    pub chain_length: u32,
    pub target_x: f32,
    pub target_y: f32,
    pub bend_positive: bool,
    /// Blend factor in [0, 1]; 0 leaves bones untouched.
    pub mix: f32,
    pub enabled: bool,
}

impl IkConstraint {
    pub fn new(id: ConstraintId, name: impl Into<String>, target_bone: BoneId) -> Self {
        Self {
            id,
            name: name.into(),
            target_bone,
            chain_length: 2,
            target_x: 0.0,
            target_y: 0.0,
            bend_positive: true,
            mix: 1.0,
            enabled: true,
        }
    }
}

/// Easing applied to normalized progress between two keyframes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Holds the first keyframe's value until the very end, then snaps.
    Step,
    /// Arbitrary cubic-bezier with control points in the unit square
    /// (CSS `cubic-bezier(x1, y1, x2, y2)` convention).
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for Easing {
    fn default() -> Self {
        Self::Linear
    }
}

/// One sparse keyframe. A keyframe need not specify every property; absent
/// properties leave the bone untouched when this keyframe is interpolated.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Milliseconds.
    pub time: f32,
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Degrees.
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub easing: Easing,
}

impl Keyframe {
    pub fn at(time: f32) -> Self {
        Self {
            time,
            x: None,
            y: None,
            rotation: None,
            scale_x: None,
            scale_y: None,
            easing: Easing::Linear,
        }
    }
}

/// Result of evaluating a track at a point in time. Only the properties
/// present interpolate into the bone.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseDelta {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub rotation: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
}

impl PoseDelta {
    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.rotation.is_none()
            && self.scale_x.is_none()
            && self.scale_y.is_none()
    }

    /// Writes the present properties into `bone`.
    pub fn apply_to(&self, bone: &mut Bone) {
        if let Some(x) = self.x {
            bone.x = x;
        }
        if let Some(y) = self.y {
            bone.y = y;
        }
        if let Some(rotation) = self.rotation {
            bone.rotation = rotation;
        }
        if let Some(scale_x) = self.scale_x {
            bone.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            bone.scale_y = scale_y;
        }
    }
}

/// Keyframes within this tolerance of each other are considered the same
/// point in time; inserting replaces instead of duplicating.
pub const KEYFRAME_TIME_TOLERANCE_MS: f32 = 1.0;

/// Time-ordered keyframes for one bone.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationTrack {
    pub bone: BoneId,
    pub keyframes: Vec<Keyframe>,
}

impl AnimationTrack {
    pub fn new(bone: BoneId) -> Self {
        Self {
            bone,
            keyframes: Vec::new(),
        }
    }

    /// Inserts keeping time order; a keyframe within 1 ms of an existing one
    /// replaces it.
    pub fn insert(&mut self, keyframe: Keyframe) {
        if let Some(existing) = self
            .keyframes
            .iter_mut()
            .find(|k| (k.time - keyframe.time).abs() < KEYFRAME_TIME_TOLERANCE_MS)
        {
            *existing = keyframe;
            return;
        }
        let index = self
            .keyframes
            .partition_point(|k| k.time <= keyframe.time);
        self.keyframes.insert(index, keyframe);
    }

    pub fn remove_at(&mut self, time: f32) -> Option<Keyframe> {
        let index = self
            .keyframes
            .iter()
            .position(|k| (k.time - time).abs() < KEYFRAME_TIME_TOLERANCE_MS)?;
        Some(self.keyframes.remove(index))
    }
}

/// A named animation over a set of per-bone tracks.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct RigAnimation {
    pub id: AnimationId,
    pub name: String,
    /// Milliseconds.
    pub duration: f32,
    pub fps: f32,
    pub looping: bool,
    pub tracks: Vec<AnimationTrack>,
}

impl RigAnimation {
    pub fn new(id: AnimationId, name: impl Into<String>, duration: f32) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
            fps: 30.0,
            looping: true,
            tracks: Vec::new(),
        }
    }

    pub fn track_for(&self, bone: BoneId) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.bone == bone)
    }

    pub fn track_for_mut(&mut self, bone: BoneId) -> &mut AnimationTrack {
        if let Some(index) = self.tracks.iter().position(|t| t.bone == bone) {
            return &mut self.tracks[index];
        }
        self.tracks.push(AnimationTrack::new(bone));
        let index = self.tracks.len() - 1;
        &mut self.tracks[index]
    }
}

/// An RGBA8 raster. The alpha channel is the silhouette mask; decode/encode
/// happens upstream of this crate.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba8Image {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Rgba8Image {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[(y as usize * self.width as usize + x as usize) * 4 + 3]
    }

    pub fn pixel_at(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }
}
