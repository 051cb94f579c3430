//! Principal-axis moment analysis of the opaque pixel cloud.

use glam::Vec2;

use crate::{Error, Rgba8Image};

pub(crate) const MIN_OPAQUE_PIXELS: usize = 100;

/// Fraction of the major-axis span sampled at each extreme when deciding
/// which end of the body is the feet.
const ORIENTATION_BAND: f32 = 0.10;

/// The silhouette's principal frame: centroid, unit major axis pointing
/// head to feet, unit minor axis pointing toward +x, and the projection
/// extent of the opaque pixels along the major axis (relative to centroid).
#[derive(Clone, Debug)]
pub(crate) struct MaskFrame {
    pub centroid: Vec2,
    pub axis: Vec2,
    pub minor: Vec2,
    pub t_min: f32,
    pub t_max: f32,
}

impl MaskFrame {
    pub fn span(&self) -> f32 {
        self.t_max - self.t_min
    }

    /// World position of body-frame coordinates (t along the major axis,
    /// u along the minor axis).
    pub fn point(&self, t: f32, u: f32) -> Vec2 {
        self.centroid + self.axis * t + self.minor * u
    }
}

/// Pixel centers with alpha at or above the threshold.
pub(crate) fn collect_opaque(image: &Rgba8Image, threshold: u8) -> Vec<Vec2> {
    let mut pixels = Vec::new();
    for y in 0..image.height {
        for x in 0..image.width {
            if image.alpha_at(x, y) >= threshold {
                pixels.push(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
            }
        }
    }
    pixels
}

/// Derives the principal frame from the opaque pixel cloud.
///
/// The major axis comes from the 2x2 covariance matrix of pixel coordinates
/// (`0.5 * atan2(2*cov_xy, var_xx - var_yy)`), i.e. the body's long axis
/// regardless of source orientation. Pixel rows grow downward, so the axis
/// is flipped if the end with the larger mean row turned out to be the
/// head end.
pub(crate) fn analyze_frame(pixels: &[Vec2]) -> Result<MaskFrame, Error> {
    if pixels.len() < MIN_OPAQUE_PIXELS {
        return Err(Error::InsufficientSilhouette {
            message: format!(
                "{} opaque pixels, need at least {MIN_OPAQUE_PIXELS}",
                pixels.len()
            ),
        });
    }

    // f64 accumulators: megapixel masks overflow f32 second moments.
    let n = pixels.len() as f64;
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for p in pixels {
        sx += p.x as f64;
        sy += p.y as f64;
    }
    let cx = sx / n;
    let cy = sy / n;

    let (mut sxx, mut syy, mut sxy) = (0.0f64, 0.0f64, 0.0f64);
    for p in pixels {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let var_x = sxx / n;
    let var_y = syy / n;
    let cov = sxy / n;

    let angle = 0.5 * (2.0 * cov).atan2(var_x - var_y);
    let mut axis = Vec2::new(angle.cos() as f32, angle.sin() as f32);
    let centroid = Vec2::new(cx as f32, cy as f32);

    let (t_min, t_max) = projection_extent(pixels, centroid, axis);
    let span = t_max - t_min;

    // Feet are the end with the numerically larger mean pixel row.
    let band = span * ORIENTATION_BAND;
    let head_row = mean_row_in_band(pixels, centroid, axis, t_min, t_min + band);
    let feet_row = mean_row_in_band(pixels, centroid, axis, t_max - band, t_max);
    let mut t_min = t_min;
    let mut t_max = t_max;
    if feet_row < head_row {
        axis = -axis;
        let flipped_min = -t_max;
        t_max = -t_min;
        t_min = flipped_min;
    }

    let mut minor = Vec2::new(-axis.y, axis.x);
    if minor.x < 0.0 {
        minor = -minor;
    }

    Ok(MaskFrame {
        centroid,
        axis,
        minor,
        t_min,
        t_max,
    })
}

fn projection_extent(pixels: &[Vec2], centroid: Vec2, axis: Vec2) -> (f32, f32) {
    let mut t_min = f32::MAX;
    let mut t_max = f32::MIN;
    for p in pixels {
        let t = (*p - centroid).dot(axis);
        t_min = t_min.min(t);
        t_max = t_max.max(t);
    }
    (t_min, t_max)
}

fn mean_row_in_band(pixels: &[Vec2], centroid: Vec2, axis: Vec2, lo: f32, hi: f32) -> f32 {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for p in pixels {
        let t = (*p - centroid).dot(axis);
        if t >= lo && t <= hi {
            sum += p.y as f64;
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64) as f32
}
