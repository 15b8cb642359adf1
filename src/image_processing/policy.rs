//! Sizing policies and the pixel geometry they produce.
//!
//! Geometry is computed from the upright (EXIF-normalized) source size only,
//! so the same code serves real conversions and header-only dry runs.

use serde::Serialize;

use crate::error::ConfigError;

/// How a source image is mapped onto the output size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum SizingPolicy {
    /// Uniform scale so the image fits inside `max_size` (oriented like the
    /// source), never scaling by more than `max_ratio`.
    ScaleToFit { max_size: (u32, u32), max_ratio: f64 },
    /// Uniform scale so the image covers `max_size`, then a centered crop to
    /// exactly `max_size`.
    ScaleAndCrop { max_size: (u32, u32) },
    /// Uniform scale by a fixed factor in (0, 1].
    Ratio { ratio: f64 },
}

/// Crop window in resized-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Resize target plus optional crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub resize_to: (u32, u32),
    pub crop: Option<CropBox>,
}

impl Geometry {
    /// Size of the image that will be written
    pub fn output_size(&self) -> (u32, u32) {
        match self.crop {
            Some(crop) => (crop.width, crop.height),
            None => self.resize_to,
        }
    }
}

impl SizingPolicy {
    /// Build the ratio-mode policy from a percentage (1-100).
    pub fn from_ratio_percent(percent: u32) -> Result<Self, ConfigError> {
        if !(1..=100).contains(&percent) {
            return Err(ConfigError::Ratio(percent));
        }
        Ok(SizingPolicy::Ratio {
            ratio: percent as f64 / 100.0,
        })
    }

    /// Parse a target-size spec of the form `"dim1, dim2, max_ratio"`.
    ///
    /// The two dimensions are normalized to `(larger, smaller)`. A max ratio of
    /// `0` selects [`SizingPolicy::ScaleAndCrop`]; any positive value selects
    /// [`SizingPolicy::ScaleToFit`] bounded by that ratio.
    pub fn parse_target(spec: &str) -> Result<Self, ConfigError> {
        let fields: Vec<&str> = spec.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(ConfigError::TargetFormat(spec.to_string()));
        }

        let dim1 = parse_dimension(fields[0])?;
        let dim2 = parse_dimension(fields[1])?;
        let max_ratio = fields[2]
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite() && *r >= 0.0)
            .ok_or_else(|| ConfigError::MaxRatio(fields[2].to_string()))?;

        let max_size = (dim1.max(dim2), dim1.min(dim2));
        if max_ratio == 0.0 {
            Ok(SizingPolicy::ScaleAndCrop { max_size })
        } else {
            Ok(SizingPolicy::ScaleToFit { max_size, max_ratio })
        }
    }

    /// Compute resize and crop for an upright source of the given size
    pub fn geometry(&self, src_width: u32, src_height: u32) -> Geometry {
        let (sw, sh) = (src_width as f64, src_height as f64);

        match *self {
            SizingPolicy::ScaleToFit { max_size, max_ratio } => {
                // Orient the box like the source
                let (box_w, box_h) = if src_height > src_width {
                    (max_size.1, max_size.0)
                } else {
                    max_size
                };
                let ratio_w = box_w as f64 / sw;
                let ratio_h = box_h as f64 / sh;
                let scale = ratio_w.min(ratio_h).min(max_ratio);

                Geometry {
                    resize_to: (scaled(sw, scale), scaled(sh, scale)),
                    crop: None,
                }
            }
            SizingPolicy::ScaleAndCrop { max_size } => {
                let (target_w, target_h) = max_size;
                let scale = (target_w as f64 / sw).max(target_h as f64 / sh);

                // Rounding must never leave the resized image short of the target
                let resized_w = scaled(sw, scale).max(target_w);
                let resized_h = scaled(sh, scale).max(target_h);

                let crop = if (resized_w, resized_h) == (target_w, target_h) {
                    None
                } else {
                    Some(CropBox {
                        x: (resized_w - target_w) / 2,
                        y: (resized_h - target_h) / 2,
                        width: target_w,
                        height: target_h,
                    })
                };

                Geometry {
                    resize_to: (resized_w, resized_h),
                    crop,
                }
            }
            SizingPolicy::Ratio { ratio } => Geometry {
                resize_to: (scaled(sw, ratio), scaled(sh, ratio)),
                crop: None,
            },
        }
    }

    /// One-line description for logs and summaries
    pub fn describe(&self) -> String {
        match self {
            SizingPolicy::ScaleToFit { max_size, max_ratio } => format!(
                "fit within {}x{} (max ratio {})",
                max_size.0, max_size.1, max_ratio
            ),
            SizingPolicy::ScaleAndCrop { max_size } => {
                format!("fill and crop to {}x{}", max_size.0, max_size.1)
            }
            SizingPolicy::Ratio { ratio } => format!("scale by {:.0}%", ratio * 100.0),
        }
    }
}

fn parse_dimension(field: &str) -> Result<u32, ConfigError> {
    field
        .parse::<u32>()
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| ConfigError::Dimension(field.to_string()))
}

/// Half-pixel ties round to even, so 400.5 becomes 400
fn scaled(length: f64, scale: f64) -> u32 {
    ((length * scale).round_ties_even() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit(w: u32, h: u32, max_ratio: f64) -> SizingPolicy {
        SizingPolicy::ScaleToFit {
            max_size: (w, h),
            max_ratio,
        }
    }

    #[test]
    fn test_fit_downscales_landscape() {
        let g = fit(1920, 1080, 1.0).geometry(4000, 3000);
        // min(0.48, 0.36, 1) = 0.36
        assert_eq!(g.resize_to, (1440, 1080));
        assert_eq!(g.crop, None);
    }

    #[test]
    fn test_fit_swaps_box_for_portrait() {
        let g = fit(1920, 1080, 1.0).geometry(3000, 4000);
        assert_eq!(g.resize_to, (1080, 1440));
    }

    #[test]
    fn test_fit_never_enlarges_past_max_ratio() {
        let g = fit(1920, 1080, 1.0).geometry(800, 600);
        assert_eq!(g.output_size(), (800, 600));
    }

    #[test]
    fn test_fit_allows_enlarging_up_to_max_ratio() {
        // ratios are 2.4 and 1.8, capped at 1.5
        let g = fit(1920, 1080, 1.5).geometry(800, 600);
        assert_eq!(g.output_size(), (1200, 900));
    }

    #[test]
    fn test_half_pixel_ties_round_to_even() {
        let g = fit(1920, 1080, 0.5).geometry(801, 601);
        assert_eq!(g.resize_to, (400, 300));

        let g = fit(1920, 1080, 0.5).geometry(803, 603);
        assert_eq!(g.resize_to, (402, 302));

        let ratio = SizingPolicy::Ratio { ratio: 0.5 };
        assert_eq!(ratio.geometry(5, 7).output_size(), (2, 4));
    }

    #[test]
    fn test_fit_bounds_and_aspect_hold_across_sizes() {
        let policy = fit(1920, 1080, 1.0);
        for &(w, h) in &[
            (4000, 3000),
            (3000, 4000),
            (1000, 1000),
            (5000, 100),
            (100, 5000),
            (1921, 1081),
            (640, 480),
            (7, 3),
        ] {
            let (ow, oh) = policy.geometry(w, h).output_size();
            assert!(ow <= w && oh <= h, "{}x{} -> {}x{}", w, h, ow, oh);

            // Cross-multiplied skew stays within half a pixel per side
            let skew = (ow as i64 * h as i64 - oh as i64 * w as i64).abs();
            assert!(
                skew as f64 <= 0.5 * (w + h) as f64,
                "{}x{} -> {}x{}",
                w,
                h,
                ow,
                oh
            );
        }
    }

    #[test]
    fn test_crop_scenario_4000x3000() {
        let policy = SizingPolicy::ScaleAndCrop {
            max_size: (1920, 1080),
        };
        let g = policy.geometry(4000, 3000);

        assert_eq!(g.resize_to, (1920, 1440));
        assert_eq!(
            g.crop,
            Some(CropBox {
                x: 0,
                y: 180,
                width: 1920,
                height: 1080
            })
        );
        // rows 180..1260 are kept
        let crop = g.crop.unwrap();
        assert_eq!(crop.y + crop.height, 1260);
    }

    #[test]
    fn test_crop_horizontal_overshoot() {
        let policy = SizingPolicy::ScaleAndCrop {
            max_size: (1000, 1000),
        };
        let g = policy.geometry(4000, 2000);
        assert_eq!(g.resize_to, (2000, 1000));
        assert_eq!(
            g.crop,
            Some(CropBox {
                x: 500,
                y: 0,
                width: 1000,
                height: 1000
            })
        );
    }

    #[test]
    fn test_crop_output_always_matches_target() {
        for &target in &[(1920, 1080), (400, 600), (1, 1), (333, 777)] {
            let policy = SizingPolicy::ScaleAndCrop { max_size: target };
            for &(w, h) in &[(4000, 3000), (3000, 4000), (10, 10), (1234, 567), (3, 1000)] {
                assert_eq!(
                    policy.geometry(w, h).output_size(),
                    target,
                    "{}x{} into {:?}",
                    w,
                    h,
                    target
                );
            }
        }
    }

    #[test]
    fn test_crop_exact_aspect_needs_no_crop() {
        let policy = SizingPolicy::ScaleAndCrop {
            max_size: (800, 600),
        };
        let g = policy.geometry(1600, 1200);
        assert_eq!(g.resize_to, (800, 600));
        assert_eq!(g.crop, None);
    }

    #[test]
    fn test_ratio_mode() {
        let policy = SizingPolicy::from_ratio_percent(50).unwrap();
        assert_eq!(policy.geometry(4000, 3000).output_size(), (2000, 1500));

        let identity = SizingPolicy::from_ratio_percent(100).unwrap();
        assert_eq!(identity.geometry(801, 601).output_size(), (801, 601));

        let tiny = SizingPolicy::from_ratio_percent(1).unwrap();
        assert_eq!(tiny.geometry(50, 30).output_size(), (1, 1));
    }

    #[test]
    fn test_ratio_percent_out_of_range() {
        assert_eq!(SizingPolicy::from_ratio_percent(0), Err(ConfigError::Ratio(0)));
        assert_eq!(SizingPolicy::from_ratio_percent(101), Err(ConfigError::Ratio(101)));
    }

    #[test]
    fn test_parse_target_fit() {
        assert_eq!(SizingPolicy::parse_target("1920, 1080, 1"), Ok(fit(1920, 1080, 1.0)));
        // dimensions are normalized to (larger, smaller)
        assert_eq!(SizingPolicy::parse_target("1080, 1920, 0.5"), Ok(fit(1920, 1080, 0.5)));
        // whitespace is tolerated
        assert_eq!(SizingPolicy::parse_target("800,600,2"), Ok(fit(800, 600, 2.0)));
    }

    #[test]
    fn test_parse_target_zero_ratio_selects_crop() {
        assert_eq!(
            SizingPolicy::parse_target("400, 600, 0"),
            Ok(SizingPolicy::ScaleAndCrop { max_size: (600, 400) })
        );
    }

    #[test]
    fn test_parse_target_malformed() {
        assert_eq!(
            SizingPolicy::parse_target("1920, 1080"),
            Err(ConfigError::TargetFormat("1920, 1080".to_string()))
        );
        assert_eq!(
            SizingPolicy::parse_target("1920, 1080, 1, 2"),
            Err(ConfigError::TargetFormat("1920, 1080, 1, 2".to_string()))
        );
        assert_eq!(
            SizingPolicy::parse_target("wide, 1080, 1"),
            Err(ConfigError::Dimension("wide".to_string()))
        );
        assert_eq!(
            SizingPolicy::parse_target("0, 1080, 1"),
            Err(ConfigError::Dimension("0".to_string()))
        );
        assert_eq!(
            SizingPolicy::parse_target("1920, 1080, -1"),
            Err(ConfigError::MaxRatio("-1".to_string()))
        );
        assert_eq!(
            SizingPolicy::parse_target("1920, 1080, inf"),
            Err(ConfigError::MaxRatio("inf".to_string()))
        );
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            fit(1920, 1080, 1.0).describe(),
            "fit within 1920x1080 (max ratio 1)"
        );
        assert_eq!(
            SizingPolicy::from_ratio_percent(50).unwrap().describe(),
            "scale by 50%"
        );
    }
}
