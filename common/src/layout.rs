//! Page layout settings
//!
//! Millimetres are the source of truth; CSS pixels (96dpi) are used by the
//! rasterizer and converted here.

// ============================================
// A4 in millimetres
// ============================================

/// A4 size (mm)
pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

/// Margin on all four sides (mm)
pub const MARGIN_MM: f32 = 10.0;

/// Usable area inside the margins (mm)
pub const USABLE_WIDTH_MM: f32 = A4_WIDTH_MM - MARGIN_MM * 2.0; // 190mm
pub const USABLE_HEIGHT_MM: f32 = A4_HEIGHT_MM - MARGIN_MM * 2.0; // 277mm

// ============================================
// Conversion factors
// ============================================

/// mm → pt (1mm = 72/25.4 pt ≈ 2.835pt)
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// CSS px → mm at 96dpi
pub const PX_TO_MM: f32 = 25.4 / 96.0;

/// Width of an A4 page in CSS px; the capture viewport
pub const A4_WIDTH_PX: f32 = 794.0;

/// Device pixel scale used for every capture
pub const CAPTURE_SCALE: f32 = 2.0;

// ============================================
// Page budget
// ============================================

/// Page size and margins handed to the compositor and the slicer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBudget {
    /// Page width (mm)
    pub page_width_mm: f32,
    /// Page height (mm)
    pub page_height_mm: f32,
    /// Margin on every side (mm)
    pub margin_mm: f32,
}

impl PageBudget {
    /// A4 portrait with the default margin
    pub fn a4() -> Self {
        Self::a4_with_margin(MARGIN_MM)
    }

    pub fn a4_with_margin(margin_mm: f32) -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm,
        }
    }

    /// Available width inside the margins (mm)
    pub fn available_width_mm(&self) -> f32 {
        (self.page_width_mm - self.margin_mm * 2.0).max(0.0)
    }

    /// Available height inside the margins (mm)
    pub fn available_height_mm(&self) -> f32 {
        (self.page_height_mm - self.margin_mm * 2.0).max(0.0)
    }
}

impl Default for PageBudget {
    fn default() -> Self {
        Self::a4()
    }
}

// ============================================
// Helpers
// ============================================

/// mm → pt
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// pt → mm
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// CSS px → mm
#[inline]
pub fn px_to_mm(px: f32) -> f32 {
    px * PX_TO_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        assert!((USABLE_WIDTH_MM - 190.0).abs() < 0.01);
        assert!((USABLE_HEIGHT_MM - 277.0).abs() < 0.01);
        // 794px at 96dpi is A4 width within half a millimetre
        assert!((px_to_mm(A4_WIDTH_PX) - A4_WIDTH_MM).abs() < 0.5);
    }

    #[test]
    fn test_conversion() {
        assert!((MM_TO_PT - 2.835).abs() < 0.01);
        assert!((mm_to_pt(10.0) - 28.35).abs() < 0.1);
        assert!((pt_to_mm(mm_to_pt(42.0)) - 42.0).abs() < 0.001);
    }

    #[test]
    fn test_budget() {
        let budget = PageBudget::a4();
        assert!((budget.available_width_mm() - 190.0).abs() < 0.01);
        assert!((budget.available_height_mm() - 277.0).abs() < 0.01);

        let oversized = PageBudget::a4_with_margin(200.0);
        assert_eq!(oversized.available_width_mm(), 0.0);
    }
}
