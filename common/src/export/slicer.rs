//! Fallback slicer
//!
//! Used when a container has no page sections: one tall capture is cut into
//! equal-height strips, one strip per output page.

use super::compositor::FittedSize;
use crate::layout::PageBudget;

/// One horizontal band of the source bitmap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strip {
    /// First source row (px)
    pub source_y: u32,
    /// Rows in this strip (px)
    pub source_height: u32,
    /// Size on the page (mm)
    pub placed: FittedSize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlicePlan {
    pub pages_needed: usize,
    pub strips: Vec<Strip>,
}

impl SlicePlan {
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }
}

/// Plan the strips for a `px_width` x `px_height` capture.
///
/// `pages_needed = ceil(scaled_height / available_height)` where the capture
/// is scaled to the full available width. Strip heights are `H / pages`, the
/// first `H % pages` strips taking one extra row, so they add up to `H`.
/// A zero-sized capture yields an empty plan.
pub fn plan_slices(px_width: u32, px_height: u32, budget: &PageBudget) -> SlicePlan {
    let aw = budget.available_width_mm() as f64;
    let ah = budget.available_height_mm() as f64;
    if px_width == 0 || px_height == 0 || aw <= 0.0 || ah <= 0.0 {
        return SlicePlan {
            pages_needed: 0,
            strips: Vec::new(),
        };
    }

    let scale = aw / px_width as f64;
    let scaled_height = px_height as f64 * scale;
    // Guard against 2.0000001 style float noise turning into an extra page
    let pages_needed = ((scaled_height / ah) - 1e-9).ceil().max(1.0) as u32;
    let pages_needed = pages_needed.min(px_height);

    let base = px_height / pages_needed;
    let remainder = px_height % pages_needed;

    let mut strips = Vec::with_capacity(pages_needed as usize);
    let mut y = 0;
    for i in 0..pages_needed {
        let height = base + u32::from(i < remainder);
        // a remainder row can push a strip just past the budget; narrow it instead
        let fit = (ah / (height as f64 * scale)).min(1.0);
        strips.push(Strip {
            source_y: y,
            source_height: height,
            placed: FittedSize {
                width_mm: (aw * fit) as f32,
                height_mm: (height as f64 * scale * fit) as f32,
            },
        });
        y += height;
    }

    SlicePlan {
        pages_needed: pages_needed as usize,
        strips,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_pages_of_1500() {
        let plan = plan_slices(1200, 3000, &PageBudget::a4());
        // 3000 * 190/1200 = 475mm, ceil(475 / 277) = 2
        assert_eq!(plan.pages_needed, 2);
        assert_eq!(plan.strips.len(), 2);
        assert_eq!(plan.strips[0].source_height, 1500);
        assert_eq!(plan.strips[1].source_y, 1500);
        assert_eq!(plan.strips[1].source_height, 1500);
        assert!((plan.strips[0].placed.height_mm - 237.5).abs() < 0.01);
    }

    #[test]
    fn test_strips_cover_source_exactly() {
        let budget = PageBudget::a4();
        for (w, h) in [(1588, 10_001), (1588, 2245), (800, 7), (1200, 3001), (1588, 99_999), (1588, 18_521)] {
            let plan = plan_slices(w, h, &budget);
            let total: u32 = plan.strips.iter().map(|s| s.source_height).sum();
            assert_eq!(total, h, "{}x{}", w, h);

            let scaled = h as f64 * 190.0 / w as f64;
            let expected = (scaled / 277.0).ceil() as usize;
            assert_eq!(plan.pages_needed, expected.min(h as usize), "{}x{}", w, h);

            // contiguous
            let mut y = 0;
            for strip in &plan.strips {
                assert_eq!(strip.source_y, y);
                y += strip.source_height;
                assert!(strip.placed.height_mm <= 277.0);
            }
        }
    }

    #[test]
    fn test_remainder_strip_stays_inside_budget() {
        // 18521 rows over 8 pages: the first strip gets 2316 rows
        let plan = plan_slices(1588, 18521, &PageBudget::a4());
        assert_eq!(plan.pages_needed, 8);
        assert_eq!(plan.strips[0].source_height, 2316);
        for strip in &plan.strips {
            assert!(strip.placed.height_mm <= 277.0, "{}", strip.placed.height_mm);
            assert!(strip.placed.width_mm <= 190.0);
            let ratio = strip.placed.width_mm / strip.placed.height_mm;
            let source = 1588.0 / strip.source_height as f32;
            assert!((ratio - source).abs() < 1e-3);
        }
    }

    #[test]
    fn test_short_capture_is_one_page() {
        let plan = plan_slices(1588, 500, &PageBudget::a4());
        assert_eq!(plan.pages_needed, 1);
        assert_eq!(plan.strips[0].source_height, 500);
    }

    #[test]
    fn test_zero_height_adds_no_pages() {
        let plan = plan_slices(1588, 0, &PageBudget::a4());
        assert_eq!(plan.pages_needed, 0);
        assert!(plan.is_empty());
    }
}
