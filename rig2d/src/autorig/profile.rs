//! Cross-sectional width profiling along the major axis.

use glam::Vec2;

use crate::Error;

use super::moments::MaskFrame;

pub(crate) const MIN_POPULATED_BINS: usize = 10;

const MIN_BINS: usize = 64;
const MAX_BINS: usize = 2048;

/// One projection bin: opaque pixel count and the minor-axis extent of the
/// pixels that landed in it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Bin {
    pub count: u32,
    pub u_min: f32,
    pub u_max: f32,
}

impl Bin {
    const EMPTY: Self = Self {
        count: 0,
        u_min: f32::MAX,
        u_max: f32::MIN,
    };

    pub fn width(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.u_max - self.u_min
        }
    }

    pub fn u_center(&self) -> f32 {
        (self.u_min + self.u_max) * 0.5
    }
}

/// Width profile of the silhouette in body-frame coordinates.
#[derive(Clone, Debug)]
pub(crate) struct WidthProfile {
    pub bins: Vec<Bin>,
    pub t_min: f32,
    pub span: f32,
}

impl WidthProfile {
    /// Major-axis coordinate of a bin center (relative to the centroid).
    pub fn t_of_bin(&self, index: usize) -> f32 {
        self.t_min + (index as f32 + 0.5) / self.bins.len() as f32 * self.span
    }

    /// Normalized body-height ratio of a bin center, 0 at the head end.
    pub fn ratio_of_bin(&self, index: usize) -> f32 {
        (index as f32 + 0.5) / self.bins.len() as f32
    }

    /// Widest populated bin with center ratio inside `[lo, hi]`.
    pub fn widest_in_band(&self, lo: f32, hi: f32) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, bin) in self.bins.iter().enumerate() {
            if bin.count == 0 {
                continue;
            }
            let ratio = self.ratio_of_bin(i);
            if ratio < lo || ratio > hi {
                continue;
            }
            if best.is_none_or(|b| bin.width() > self.bins[b].width()) {
                best = Some(i);
            }
        }
        best
    }

    /// Populated bin whose center ratio is nearest to `ratio`.
    pub fn nearest_populated(&self, ratio: f32) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, bin) in self.bins.iter().enumerate() {
            if bin.count == 0 {
                continue;
            }
            let distance = (self.ratio_of_bin(i) - ratio).abs();
            if best.is_none_or(|b| distance < (self.ratio_of_bin(b) - ratio).abs()) {
                best = Some(i);
            }
        }
        best
    }

    /// Band search with fallbacks: widest bin in the band, else
    /// the populated bin nearest the fallback ratio, else the globally
    /// widest bin (at least one bin is populated by construction).
    pub fn landmark_bin(&self, lo: f32, hi: f32, fallback_ratio: f32) -> usize {
        self.widest_in_band(lo, hi)
            .or_else(|| self.nearest_populated(fallback_ratio))
            .or_else(|| self.widest_in_band(0.0, 1.0))
            .unwrap_or(0)
    }
}

/// Projects every opaque pixel onto the major axis into uniform bins, 64 to
/// 2048 of them scaled to body height, recording the minor-axis extent per
/// bin. Fewer than 10 populated bins is a hard failure: there is not enough
/// cross-sectional structure to place landmarks.
pub(crate) fn build(pixels: &[Vec2], frame: &MaskFrame) -> Result<WidthProfile, Error> {
    let span = frame.span();
    if span <= 1.0 {
        return Err(Error::InsufficientSilhouette {
            message: format!("degenerate body span ({span:.2} px) along the major axis"),
        });
    }

    let bin_count = (span.round() as usize).clamp(MIN_BINS, MAX_BINS);
    let mut bins = vec![Bin::EMPTY; bin_count];
    for p in pixels {
        let d = *p - frame.centroid;
        let t = d.dot(frame.axis);
        let u = d.dot(frame.minor);
        let index = (((t - frame.t_min) / span) * bin_count as f32) as usize;
        let bin = &mut bins[index.min(bin_count - 1)];
        bin.count += 1;
        bin.u_min = bin.u_min.min(u);
        bin.u_max = bin.u_max.max(u);
    }

    let populated = bins.iter().filter(|b| b.count > 0).count();
    if populated < MIN_POPULATED_BINS {
        return Err(Error::InsufficientSilhouette {
            message: format!(
                "only {populated} populated cross-section bins, need at least {MIN_POPULATED_BINS}"
            ),
        });
    }

    Ok(WidthProfile {
        bins,
        t_min: frame.t_min,
        span,
    })
}
