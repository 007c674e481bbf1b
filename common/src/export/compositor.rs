//! Page compositor: fits one bitmap onto one page
//!
//! Geometry only; the PDF accumulator in the root crate turns placements into
//! drawing calls.

use crate::layout::PageBudget;

/// Size of an image after fitting it into the page budget (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Scale a `px_width` x `px_height` bitmap into the available area.
///
/// Full available width is tried first. When the derived height overflows,
/// height is fixed to the budget and width derived instead. The aspect ratio
/// is preserved and at least one side equals its budget. A degenerate bitmap
/// fits to a zero size.
pub fn fit_to_budget(px_width: u32, px_height: u32, budget: &PageBudget) -> FittedSize {
    let aw = budget.available_width_mm();
    let ah = budget.available_height_mm();
    if px_width == 0 || px_height == 0 || aw <= 0.0 || ah <= 0.0 {
        return FittedSize {
            width_mm: 0.0,
            height_mm: 0.0,
        };
    }

    let ratio = px_height as f64 / px_width as f64;
    let height = aw as f64 * ratio;
    if height <= ah as f64 {
        FittedSize {
            width_mm: aw,
            height_mm: height as f32,
        }
    } else {
        FittedSize {
            width_mm: (ah as f64 / ratio) as f32,
            height_mm: ah,
        }
    }
}

/// Where an image lands in the output document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Zero-based output page
    pub page_index: usize,
    /// Left edge (mm)
    pub x_mm: f32,
    /// Top edge measured from the top of the page (mm)
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    /// A blank page has to be added before drawing
    pub new_page: bool,
}

impl Placement {
    /// Width over height of the placed image
    pub fn aspect_ratio(&self) -> f32 {
        if self.height_mm == 0.0 {
            0.0
        } else {
            self.width_mm / self.height_mm
        }
    }

    /// Bottom edge measured from the bottom of the page, as PDF coordinates expect
    pub fn y_from_bottom_mm(&self, page_height_mm: f32) -> f32 {
        page_height_mm - self.y_mm - self.height_mm
    }
}

/// One image per page, first image on the document's initial page
#[derive(Debug, Clone)]
pub struct PageCompositor {
    budget: PageBudget,
    pages_placed: usize,
}

impl PageCompositor {
    pub fn new(budget: PageBudget) -> Self {
        Self {
            budget,
            pages_placed: 0,
        }
    }

    pub fn budget(&self) -> &PageBudget {
        &self.budget
    }

    pub fn pages_placed(&self) -> usize {
        self.pages_placed
    }

    /// Fit and place the next bitmap, advancing the page
    pub fn place(&mut self, px_width: u32, px_height: u32) -> Placement {
        let size = fit_to_budget(px_width, px_height, &self.budget);
        self.place_sized(size)
    }

    /// Place an already fitted image (slicer strips come in pre-sized)
    pub fn place_sized(&mut self, size: FittedSize) -> Placement {
        let placement = Placement {
            page_index: self.pages_placed,
            x_mm: self.budget.margin_mm,
            y_mm: self.budget.margin_mm,
            width_mm: size.width_mm,
            height_mm: size.height_mm,
            new_page: self.pages_placed > 0,
        };
        self.pages_placed += 1;
        placement
    }
}
