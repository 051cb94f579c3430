use std::collections::HashMap;

use crate::{Easing, Keyframe, PoseDelta};

use super::shortest_rotation;

// Interleaved x,y samples of a flattened unit-domain bezier.
const BEZIER_SIZE: usize = 18;

type BezierTable = [f32; BEZIER_SIZE];

/// Curves are cached by the bit patterns of their four control points; two
/// easings with identical points share one table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct BezierKey([u32; 4]);

impl BezierKey {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self([x1.to_bits(), y1.to_bits(), x2.to_bits(), y2.to_bits()])
    }
}

/// Evaluates sparse keyframe tracks at arbitrary query times.
///
/// Owns the bezier sample cache: the same curve is evaluated many times per
/// second during playback, so each distinct control-point tuple is flattened
/// once and reused. [`TimelineEvaluator::clear`] resets the cache.
#[derive(Debug, Default)]
pub struct TimelineEvaluator {
    curves: HashMap<BezierKey, BezierTable>,
}

impl TimelineEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.curves.clear();
    }

    pub fn cached_curves(&self) -> usize {
        self.curves.len()
    }

    /// Evaluates `keyframes` at `time` (milliseconds).
    ///
    /// Keyframes are sorted by time here if the caller hands them over
    /// unordered. Returns `None` for an empty track. At or before the first
    /// keyframe the first keyframe's values are returned verbatim, at or
    /// after the last the last's — no extrapolation. In between, properties
    /// present in both bracketing keyframes blend by the first keyframe's
    /// easing; rotation blends along the shortest angular path.
    pub fn evaluate(&mut self, keyframes: &[Keyframe], time: f32) -> Option<PoseDelta> {
        if keyframes.is_empty() {
            return None;
        }

        let mut sorted;
        let frames: &[Keyframe] = if keyframes.windows(2).all(|w| w[0].time <= w[1].time) {
            keyframes
        } else {
            sorted = keyframes.to_vec();
            sorted.sort_by(|a, b| a.time.total_cmp(&b.time));
            &sorted
        };

        let first = &frames[0];
        if time <= first.time {
            return Some(delta_of(first));
        }
        let last = &frames[frames.len() - 1];
        if time >= last.time {
            return Some(delta_of(last));
        }

        let index = frames.partition_point(|k| k.time <= time);
        let k1 = &frames[index - 1];
        let k2 = &frames[index];
        let denom = k2.time - k1.time;
        if denom <= 1.0e-12 {
            return Some(delta_of(k2));
        }
        let t = (time - k1.time) / denom;
        let progress = self.progress(k1.easing, t);

        Some(PoseDelta {
            x: blend(k1.x, k2.x, progress),
            y: blend(k1.y, k2.y, progress),
            rotation: blend_angle(k1.rotation, k2.rotation, progress),
            scale_x: blend(k1.scale_x, k2.scale_x, progress),
            scale_y: blend(k1.scale_y, k2.scale_y, progress),
        })
    }

    fn progress(&mut self, easing: Easing, t: f32) -> f32 {
        match easing {
            Easing::Linear => t,
            Easing::Step => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Easing::EaseIn => self.bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => self.bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => self.bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::CubicBezier { x1, y1, x2, y2 } => self.bezier(x1, y1, x2, y2, t),
        }
    }

    fn bezier(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
        let table = self
            .curves
            .entry(BezierKey::new(x1, y1, x2, y2))
            .or_insert_with(|| sample_curve(x1, y1, x2, y2));
        curve_progress(table, t)
    }
}

/// One-shot track evaluation with a throwaway curve cache. Playback code
/// should hold a [`TimelineEvaluator`] and reuse it so bezier easings are
/// flattened once, not per query.
pub fn evaluate_track(keyframes: &[Keyframe], time: f32) -> Option<PoseDelta> {
    TimelineEvaluator::new().evaluate(keyframes, time)
}

fn blend(a: Option<f32>, b: Option<f32>, progress: f32) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + (b - a) * progress),
        // Sparse-property semantics: a field absent from either side is left
        // untouched rather than blended against a guess.
        _ => None,
    }
}

fn blend_angle(a: Option<f32>, b: Option<f32>, progress: f32) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + shortest_rotation(b - a) * progress),
        _ => None,
    }
}

fn delta_of(k: &Keyframe) -> PoseDelta {
    PoseDelta {
        x: k.x,
        y: k.y,
        rotation: k.rotation,
        scale_x: k.scale_x,
        scale_y: k.scale_y,
    }
}

// Flattens cubic-bezier(x1, y1, x2, y2) over the unit domain by forward
// differencing into BEZIER_SIZE/2 interleaved sample points.
fn sample_curve(x1: f32, y1: f32, x2: f32, y2: f32) -> BezierTable {
    let tmpx = (x2 - x1 * 2.0) * 0.03;
    let tmpy = (y2 - y1 * 2.0) * 0.03;
    let dddx = ((x1 - x2) * 3.0 + 1.0) * 0.006;
    let dddy = ((y1 - y2) * 3.0 + 1.0) * 0.006;
    let mut ddx = tmpx * 2.0 + dddx;
    let mut ddy = tmpy * 2.0 + dddy;
    let mut dx = x1 * 0.3 + tmpx + dddx * 0.16666667;
    let mut dy = y1 * 0.3 + tmpy + dddy * 0.16666667;

    let mut x = dx;
    let mut y = dy;
    let mut points = [0.0f32; BEZIER_SIZE];
    for i in (0..BEZIER_SIZE).step_by(2) {
        points[i] = x;
        points[i + 1] = y;
        dx += ddx;
        dy += ddy;
        ddx += dddx;
        ddy += dddy;
        x += dx;
        y += dy;
    }
    points
}

// Piecewise-linear lookup through the sample table, with head and tail
// segments anchored at (0,0) and (1,1).
fn curve_progress(points: &BezierTable, t: f32) -> f32 {
    if points[0] > t {
        let denom = points[0];
        if denom.abs() <= 1.0e-12 {
            return 0.0;
        }
        return t / denom * points[1];
    }

    for i in (2..BEZIER_SIZE).step_by(2) {
        if points[i] >= t {
            let x = points[i - 2];
            let y = points[i - 1];
            let denom = points[i] - x;
            if denom.abs() <= 1.0e-12 {
                return y;
            }
            return y + (t - x) / denom * (points[i + 1] - y);
        }
    }

    let x = points[BEZIER_SIZE - 2];
    let y = points[BEZIER_SIZE - 1];
    let denom = 1.0 - x;
    if denom.abs() <= 1.0e-12 {
        return y;
    }
    y + (t - x) / denom * (1.0 - y)
}
