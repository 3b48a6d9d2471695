//! Pure calculation functions for image dimensions and overlay placement.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Anchor, Resize};

/// Calculate dimensions needed to fill a target area (resize before crop).
///
/// Returns dimensions that completely cover the target area while maintaining
/// the source aspect ratio. One dimension will match exactly, the other may exceed.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Target area dimensions (width, height)
///
/// # Returns
/// * `(width, height)` - Fill dimensions (at least one matches target)
pub fn calculate_fill_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: height will match, width will exceed
        let h = tgt_h;
        let w = ((h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, h)
    } else {
        // Source is taller: width will match, height will exceed
        let w = tgt_w;
        let h = ((w as f64 / src_aspect).round() as u32).max(tgt_h);
        (w, h)
    }
}

/// Offset of the centered `target` window inside a `filled` image.
pub fn calculate_crop_offset(filled: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    (
        filled.0.saturating_sub(target.0) / 2,
        filled.1.saturating_sub(target.1) / 2,
    )
}

/// Scale `source` down so one edge fits under `bound`, keeping the aspect ratio.
///
/// Returns the source unchanged when it already fits (never upscales).
/// The other edge never rounds below 1px.
fn fit_under(source: (u32, u32), bound: u32, by_height: bool) -> (u32, u32) {
    let (src_w, src_h) = source;
    let edge = if by_height { src_h } else { src_w };
    if edge <= bound {
        return source;
    }
    let ratio = bound as f64 / edge as f64;
    if by_height {
        (((src_w as f64 * ratio).round() as u32).max(1), bound)
    } else {
        (bound, ((src_h as f64 * ratio).round() as u32).max(1))
    }
}

/// Final output dimensions for a source under a sizing policy.
///
/// # Examples
/// ```
/// # use downsize::imaging::{Resize, calculate_output_dimensions};
/// // Cover always yields exactly the requested box
/// assert_eq!(calculate_output_dimensions((640, 480), Some(Resize::Cover { width: 100, height: 100 })), (100, 100));
///
/// // Max width scales down, preserving 4:3
/// assert_eq!(calculate_output_dimensions((640, 480), Some(Resize::MaxWidth(320))), (320, 240));
///
/// // Never upscales
/// assert_eq!(calculate_output_dimensions((640, 480), Some(Resize::MaxHeight(1000))), (640, 480));
/// ```
pub fn calculate_output_dimensions(source: (u32, u32), resize: Option<Resize>) -> (u32, u32) {
    match resize {
        None => source,
        Some(Resize::Cover { width, height }) => (width, height),
        Some(Resize::MaxHeight(bound)) => fit_under(source, bound, true),
        Some(Resize::MaxWidth(bound)) => fit_under(source, bound, false),
    }
}

/// Top-left position of an overlay anchored inside a base image.
///
/// Overlays larger than the base produce negative offsets, which clip.
pub fn calculate_anchor_offset(base: (u32, u32), overlay: (u32, u32), anchor: Anchor) -> (i64, i64) {
    let (bw, bh) = (base.0 as i64, base.1 as i64);
    let (ow, oh) = (overlay.0 as i64, overlay.1 as i64);

    let left = 0;
    let center_x = (bw - ow) / 2;
    let right = bw - ow;
    let top = 0;
    let center_y = (bh - oh) / 2;
    let bottom = bh - oh;

    match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopCenter => (center_x, top),
        Anchor::TopRight => (right, top),
        Anchor::CenterLeft => (left, center_y),
        Anchor::CenterRight => (right, center_y),
        Anchor::BottomLeft => (left, bottom),
        Anchor::BottomCenter => (center_x, bottom),
        Anchor::BottomRight => (right, bottom),
    }
}

/// Positions covering `base` with repeated copies of `tile`, row by row.
pub fn calculate_tile_offsets(base: (u32, u32), tile: (u32, u32)) -> Vec<(i64, i64)> {
    if tile.0 == 0 || tile.1 == 0 {
        return Vec::new();
    }
    (0..base.1)
        .step_by(tile.1 as usize)
        .flat_map(|y| {
            (0..base.0)
                .step_by(tile.0 as usize)
                .map(move |x| (x as i64, y as i64))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_fill_dimensions tests
    // =========================================================================

    #[test]
    fn fill_wider_source_to_portrait_target() {
        // 800x600 (4:3) → 400x500 target
        // Source is wider, so height matches: 500, width = 500 * (4/3) = 667
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 500)), (667, 500));
    }

    #[test]
    fn fill_taller_source_to_landscape_target() {
        // 600x800 (3:4) → 500x400 target
        assert_eq!(calculate_fill_dimensions((600, 800), (500, 400)), (500, 667));
    }

    #[test]
    fn fill_same_aspect_ratio() {
        assert_eq!(calculate_fill_dimensions((800, 600), (400, 300)), (400, 300));
    }

    #[test]
    fn fill_upscales_small_sources() {
        // Cover semantics: a 50x50 source still fills 200x100
        assert_eq!(calculate_fill_dimensions((50, 50), (200, 100)), (200, 200));
    }

    #[test]
    fn crop_offset_centers_window() {
        assert_eq!(calculate_crop_offset((667, 500), (400, 500)), (133, 0));
        assert_eq!(calculate_crop_offset((400, 300), (400, 300)), (0, 0));
    }

    // =========================================================================
    // calculate_output_dimensions tests
    // =========================================================================

    #[test]
    fn no_resize_keeps_source() {
        assert_eq!(calculate_output_dimensions((123, 45), None), (123, 45));
    }

    #[test]
    fn cover_is_exact() {
        let resize = Resize::Cover {
            width: 300,
            height: 200,
        };
        for source in [(10, 10), (4000, 100), (100, 4000), (300, 200)] {
            assert_eq!(calculate_output_dimensions(source, Some(resize)), (300, 200));
        }
    }

    #[test]
    fn max_height_preserves_aspect() {
        assert_eq!(
            calculate_output_dimensions((1920, 1080), Some(Resize::MaxHeight(540))),
            (960, 540)
        );
    }

    #[test]
    fn max_width_preserves_aspect() {
        assert_eq!(
            calculate_output_dimensions((1080, 1920), Some(Resize::MaxWidth(540))),
            (540, 960)
        );
    }

    #[test]
    fn max_bounds_never_upscale() {
        assert_eq!(
            calculate_output_dimensions((100, 80), Some(Resize::MaxWidth(400))),
            (100, 80)
        );
        assert_eq!(
            calculate_output_dimensions((100, 80), Some(Resize::MaxHeight(80))),
            (100, 80)
        );
    }

    #[test]
    fn max_bounds_hold_for_many_sizes() {
        for (w, h) in [(1, 1000), (1000, 1), (333, 777), (4096, 2160)] {
            let (ow, oh) = calculate_output_dimensions((w, h), Some(Resize::MaxWidth(100)));
            assert!(ow <= 100 && oh >= 1, "{w}x{h} → {ow}x{oh}");
            let (ow, oh) = calculate_output_dimensions((w, h), Some(Resize::MaxHeight(100)));
            assert!(oh <= 100 && ow >= 1, "{w}x{h} → {ow}x{oh}");
        }
    }

    // =========================================================================
    // overlay placement tests
    // =========================================================================

    #[test]
    fn anchor_corners_and_edges() {
        let base = (100, 80);
        let mark = (20, 10);
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::TopLeft), (0, 0));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::TopCenter), (40, 0));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::TopRight), (80, 0));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::CenterLeft), (0, 35));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::CenterRight), (80, 35));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::BottomLeft), (0, 70));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::BottomCenter), (40, 70));
        assert_eq!(calculate_anchor_offset(base, mark, Anchor::BottomRight), (80, 70));
    }

    #[test]
    fn oversized_overlay_goes_negative() {
        assert_eq!(
            calculate_anchor_offset((10, 10), (20, 20), Anchor::BottomRight),
            (-10, -10)
        );
    }

    #[test]
    fn tiles_cover_whole_base() {
        let offsets = calculate_tile_offsets((50, 25), (20, 10));
        // 3 columns (0, 20, 40) x 3 rows (0, 10, 20)
        assert_eq!(offsets.len(), 9);
        assert_eq!(offsets[0], (0, 0));
        assert_eq!(offsets[2], (40, 0));
        assert_eq!(offsets[8], (40, 20));
    }

    #[test]
    fn empty_tile_yields_nothing() {
        assert!(calculate_tile_offsets((50, 50), (0, 10)).is_empty());
    }
}
