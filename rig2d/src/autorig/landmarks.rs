//! Anatomical landmark extraction from the width profile.

use glam::Vec2;

use super::moments::MaskFrame;
use super::profile::WidthProfile;

// Normalized-height search bands and fallback ratios.
const SHOULDER_BAND: (f32, f32) = (0.18, 0.40);
const SHOULDER_FALLBACK: f32 = 0.28;
const HIP_BAND: (f32, f32) = (0.48, 0.74);
const HIP_FALLBACK: f32 = 0.60;
/// Feet come from the bottom 12% of the body span.
const FOOT_BAND_LO: f32 = 0.88;
/// Hands are searched from just above the shoulder row down to 82%.
const HAND_BAND_ABOVE_SHOULDER: f32 = 0.03;
const HAND_BAND_HI: f32 = 0.82;

/// Elbow sits 52% of the way shoulder->hand, knee 48% hip->foot.
const ELBOW_RATIO: f32 = 0.52;
const KNEE_RATIO: f32 = 0.48;
/// Mid-limb joints are nudged off the straight line so the IK bend
/// direction is well-defined.
const LIMB_NUDGE: f32 = 0.02;

/// Neck and head-top as fractions of span above the shoulder row.
const NECK_ABOVE_SHOULDER: f32 = 0.07;
const HEAD_TOP_ABOVE_SHOULDER: f32 = 0.22;

/// Lateral joint placement as a fraction of the measured row half-width.
const SHOULDER_LATERAL: f32 = 0.55;
const HIP_LATERAL: f32 = 0.45;
/// Hand fallback offset when the hand band has no populated bins.
const HAND_FALLBACK_LATERAL: f32 = 0.25;

/// Segments shorter than this fraction of body span are extended.
const MIN_SEGMENT_RATIO: f32 = 0.035;

/// The 16 anatomical joints, in image pixel coordinates.
#[derive(Clone, Debug)]
pub(crate) struct Joints {
    pub pelvis: Vec2,
    pub chest: Vec2,
    pub neck: Vec2,
    pub head_top: Vec2,
    pub shoulder_l: Vec2,
    pub shoulder_r: Vec2,
    pub elbow_l: Vec2,
    pub elbow_r: Vec2,
    pub hand_l: Vec2,
    pub hand_r: Vec2,
    pub hip_l: Vec2,
    pub hip_r: Vec2,
    pub knee_l: Vec2,
    pub knee_r: Vec2,
    pub foot_l: Vec2,
    pub foot_r: Vec2,
}

/// One bone segment between two joints.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Segment {
    pub key: &'static str,
    pub parent: Option<&'static str>,
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// Degrees, pixel coordinates (y grows downward).
    pub fn angle_deg(&self) -> f32 {
        let d = self.direction();
        d.y.atan2(d.x).to_degrees()
    }
}

/// Transient analyzer artifact: principal frame, joints, and the 11 bone
/// segments, plus the row half-widths the attachment slicer reuses.
#[derive(Clone, Debug)]
pub(crate) struct MaskLayout {
    pub frame: MaskFrame,
    pub span: f32,
    pub joints: Joints,
    pub segments: [Segment; 11],
    pub shoulder_half_width: f32,
    pub hip_half_width: f32,
}

/// Places the 16 joints from the width profile and connects them into the
/// fixed 11-segment topology, enforcing the minimum bone length.
pub(crate) fn extract(frame: &MaskFrame, profile: &WidthProfile) -> MaskLayout {
    let span = profile.span;

    let shoulder_bin = profile.landmark_bin(SHOULDER_BAND.0, SHOULDER_BAND.1, SHOULDER_FALLBACK);
    let hip_bin = profile.landmark_bin(HIP_BAND.0, HIP_BAND.1, HIP_FALLBACK);

    let shoulder_t = profile.t_of_bin(shoulder_bin);
    let shoulder_ratio = profile.ratio_of_bin(shoulder_bin);
    let shoulder_u = profile.bins[shoulder_bin].u_center();
    let shoulder_half = profile.bins[shoulder_bin].width() * 0.5;

    let hip_t = profile.t_of_bin(hip_bin);
    let hip_u = profile.bins[hip_bin].u_center();
    let hip_half = profile.bins[hip_bin].width() * 0.5;

    let foot_t = foot_row(profile).unwrap_or(frame.t_max);

    let chest = frame.point(shoulder_t, shoulder_u);
    let pelvis = frame.point(hip_t, hip_u);
    let neck = frame.point(shoulder_t - NECK_ABOVE_SHOULDER * span, shoulder_u);
    let head_top = frame.point(
        (shoulder_t - HEAD_TOP_ABOVE_SHOULDER * span).max(frame.t_min),
        shoulder_u,
    );

    let shoulder_l = frame.point(shoulder_t, shoulder_u - shoulder_half * SHOULDER_LATERAL);
    let shoulder_r = frame.point(shoulder_t, shoulder_u + shoulder_half * SHOULDER_LATERAL);
    let hip_l = frame.point(hip_t, hip_u - hip_half * HIP_LATERAL);
    let hip_r = frame.point(hip_t, hip_u + hip_half * HIP_LATERAL);

    let (hand_l, hand_r) = hand_extremes(frame, profile, shoulder_ratio).unwrap_or((
        shoulder_l - frame.minor * HAND_FALLBACK_LATERAL * span,
        shoulder_r + frame.minor * HAND_FALLBACK_LATERAL * span,
    ));

    let foot_l = frame.point(foot_t, hip_u - hip_half * HIP_LATERAL);
    let foot_r = frame.point(foot_t, hip_u + hip_half * HIP_LATERAL);

    let nudge = LIMB_NUDGE * span;
    // Elbows sag toward the feet, knees bow outward.
    let elbow_l = limb_joint(shoulder_l, hand_l, ELBOW_RATIO, frame.axis, nudge);
    let elbow_r = limb_joint(shoulder_r, hand_r, ELBOW_RATIO, frame.axis, nudge);
    let knee_l = limb_joint(hip_l, foot_l, KNEE_RATIO, -frame.minor, nudge);
    let knee_r = limb_joint(hip_r, foot_r, KNEE_RATIO, frame.minor, nudge);

    let joints = Joints {
        pelvis,
        chest,
        neck,
        head_top,
        shoulder_l,
        shoulder_r,
        elbow_l,
        elbow_r,
        hand_l,
        hand_r,
        hip_l,
        hip_r,
        knee_l,
        knee_r,
        foot_l,
        foot_r,
    };

    let mut segments = connect(&joints);
    enforce_min_lengths(&mut segments, frame, span);

    MaskLayout {
        frame: frame.clone(),
        span,
        joints,
        segments,
        shoulder_half_width: shoulder_half,
        hip_half_width: hip_half,
    }
}

/// Count-weighted mean major-axis position of the bins in the bottom 12%.
fn foot_row(profile: &WidthProfile) -> Option<f32> {
    let mut weighted = 0.0f32;
    let mut total = 0u32;
    for (i, bin) in profile.bins.iter().enumerate() {
        if bin.count == 0 || profile.ratio_of_bin(i) < FOOT_BAND_LO {
            continue;
        }
        weighted += profile.t_of_bin(i) * bin.count as f32;
        total += bin.count;
    }
    if total == 0 {
        return None;
    }
    Some(weighted / total as f32)
}

/// Widest lateral excursions in the hand band: the leftmost `u_min` and the
/// rightmost `u_max`, each taken at its own bin's row.
fn hand_extremes(
    frame: &MaskFrame,
    profile: &WidthProfile,
    shoulder_ratio: f32,
) -> Option<(Vec2, Vec2)> {
    let lo = shoulder_ratio - HAND_BAND_ABOVE_SHOULDER;
    let mut left: Option<(usize, f32)> = None;
    let mut right: Option<(usize, f32)> = None;
    for (i, bin) in profile.bins.iter().enumerate() {
        if bin.count == 0 {
            continue;
        }
        let ratio = profile.ratio_of_bin(i);
        if ratio < lo || ratio > HAND_BAND_HI {
            continue;
        }
        if left.is_none_or(|(_, u)| bin.u_min < u) {
            left = Some((i, bin.u_min));
        }
        if right.is_none_or(|(_, u)| bin.u_max > u) {
            right = Some((i, bin.u_max));
        }
    }
    let (li, lu) = left?;
    let (ri, ru) = right?;
    Some((
        frame.point(profile.t_of_bin(li), lu),
        frame.point(profile.t_of_bin(ri), ru),
    ))
}

/// Mid-limb joint: linear interpolation along the limb plus a small offset
/// perpendicular to it, oriented toward `bias`.
fn limb_joint(start: Vec2, end: Vec2, ratio: f32, bias: Vec2, nudge: f32) -> Vec2 {
    let mid = start.lerp(end, ratio);
    let direction = end - start;
    if direction.length_squared() <= f32::EPSILON {
        return mid + bias * nudge;
    }
    let mut perp = Vec2::new(-direction.y, direction.x).normalize();
    if perp.dot(bias) < 0.0 {
        perp = -perp;
    }
    mid + perp * nudge
}

fn connect(j: &Joints) -> [Segment; 11] {
    let seg = |key, parent, start, end| Segment {
        key,
        parent,
        start,
        end,
    };
    [
        seg("root", None, j.pelvis, j.chest),
        seg("spine", Some("root"), j.chest, j.neck),
        seg("head", Some("spine"), j.neck, j.head_top),
        seg("upper_arm_l", Some("root"), j.shoulder_l, j.elbow_l),
        seg("lower_arm_l", Some("upper_arm_l"), j.elbow_l, j.hand_l),
        seg("upper_arm_r", Some("root"), j.shoulder_r, j.elbow_r),
        seg("lower_arm_r", Some("upper_arm_r"), j.elbow_r, j.hand_r),
        seg("upper_leg_l", Some("root"), j.hip_l, j.knee_l),
        seg("lower_leg_l", Some("upper_leg_l"), j.knee_l, j.foot_l),
        seg("upper_leg_r", Some("root"), j.hip_r, j.knee_r),
        seg("lower_leg_r", Some("upper_leg_r"), j.knee_r, j.foot_r),
    ]
}

/// Extends any segment shorter than 3.5% of body span along its own
/// direction, or along the major axis when the segment is degenerate, so no
/// bone ends up with a near-zero length.
fn enforce_min_lengths(segments: &mut [Segment; 11], frame: &MaskFrame, span: f32) {
    let min_length = MIN_SEGMENT_RATIO * span;
    for segment in segments.iter_mut() {
        let length = segment.length();
        if length >= min_length {
            continue;
        }
        let direction = if length > f32::EPSILON {
            segment.direction() / length
        } else if segment.key == "head" {
            // Head grows away from the feet.
            -frame.axis
        } else {
            frame.axis
        };
        segment.end = segment.start + direction * min_length;
    }
}
