//! # Barcode Region Heuristic
//!
//! Segments candidate barcode regions from a sampled frame using geometric
//! heuristics. The chain mirrors what a hand-held scanner preview needs:
//! noise suppression, binarization, edge extraction, then a silhouette test
//! on every closed contour.
//!
//! This detector answers "barcode-shaped region present" only; it never
//! decodes symbol content. The long-to-short side ratio gate ([2.5, 8.0])
//! is the silhouette of a typical 1-D barcode.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::contrast::adaptive_threshold;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::min_area_rect;
use imageproc::point::Point;
use tracing::trace;

use scanline_core::{MIN_REGION_AREA_PX, REGION_ASPECT_MAX, REGION_ASPECT_MIN};

use crate::frame::Frame;

// =============================================================================
// Parameters
// =============================================================================

/// Tuning parameters for the region heuristic.
#[derive(Debug, Clone)]
pub struct RegionParams {
    /// Minimum contour area in px² for a region to be considered.
    pub min_area: f64,

    /// Lower bound of the accepted long-to-short side ratio.
    pub aspect_min: f64,

    /// Upper bound of the accepted long-to-short side ratio.
    pub aspect_max: f64,

    /// Gaussian blur sigma applied before thresholding.
    pub blur_sigma: f32,

    /// Neighborhood radius for the adaptive threshold.
    pub threshold_block_radius: u32,

    /// Canny low threshold.
    pub canny_low: f32,

    /// Canny high threshold.
    pub canny_high: f32,
}

impl Default for RegionParams {
    fn default() -> Self {
        RegionParams {
            min_area: MIN_REGION_AREA_PX,
            aspect_min: REGION_ASPECT_MIN,
            aspect_max: REGION_ASPECT_MAX,
            blur_sigma: 1.2,
            threshold_block_radius: 5,
            canny_low: 50.0,
            canny_high: 150.0,
        }
    }
}

// =============================================================================
// Candidate Region
// =============================================================================

/// A contour that passed the area and silhouette gates.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRegion {
    /// Corners of the minimal bounding rotated rectangle.
    pub corners: [(f32, f32); 4],

    /// Contour area in px² (shoelace over the contour polygon).
    pub area: f64,

    /// Long-to-short side ratio of the bounding rectangle.
    pub aspect_ratio: f64,
}

// =============================================================================
// Region Analyzer
// =============================================================================

/// Runs the full heuristic chain against sampled frames.
#[derive(Debug, Clone, Default)]
pub struct RegionAnalyzer {
    params: RegionParams,
}

impl RegionAnalyzer {
    /// Creates an analyzer with the given tuning parameters.
    pub fn new(params: RegionParams) -> Self {
        RegionAnalyzer { params }
    }

    /// The active tuning parameters.
    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Analyzes a sampled frame. Frames without usable dimensions yield no
    /// candidates rather than an error; the scan loop treats that as an
    /// idle cycle.
    pub fn analyze(&self, frame: &Frame) -> Vec<CandidateRegion> {
        if !frame.is_valid() {
            return Vec::new();
        }
        match frame.to_gray() {
            Ok(gray) => self.analyze_gray(&gray),
            Err(_) => Vec::new(),
        }
    }

    /// Analyzes a single-channel intensity image.
    pub fn analyze_gray(&self, gray: &GrayImage) -> Vec<CandidateRegion> {
        let blurred = gaussian_blur_f32(gray, self.params.blur_sigma);
        let binary = adaptive_threshold(&blurred, self.params.threshold_block_radius);
        let edges = canny(&binary, self.params.canny_low, self.params.canny_high);

        let contours: Vec<Contour<i32>> = find_contours(&edges);

        let mut candidates = Vec::new();
        for contour in &contours {
            // Outer borders only, the equivalent of external contour retrieval.
            if contour.border_type != BorderType::Outer || contour.parent.is_some() {
                continue;
            }
            if contour.points.len() < 4 {
                continue;
            }

            let area = contour_area(&contour.points);
            if area < self.params.min_area {
                continue;
            }

            let rect = min_area_rect(&contour.points);
            let width = side_length(rect[0], rect[1]);
            let height = side_length(rect[1], rect[2]);
            let (long, short) = if width >= height {
                (width, height)
            } else {
                (height, width)
            };
            if short < f64::EPSILON {
                continue;
            }

            let aspect_ratio = long / short;
            if aspect_ratio < self.params.aspect_min || aspect_ratio > self.params.aspect_max {
                continue;
            }

            trace!(area, aspect_ratio, "accepted barcode-shaped region");
            candidates.push(CandidateRegion {
                corners: [
                    (rect[0].x as f32, rect[0].y as f32),
                    (rect[1].x as f32, rect[1].y as f32),
                    (rect[2].x as f32, rect[2].y as f32),
                    (rect[3].x as f32, rect[3].y as f32),
                ],
                area,
                aspect_ratio,
            });
        }

        candidates
    }
}

/// Polygon area via the shoelace formula.
fn contour_area(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut doubled = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        doubled += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (doubled.abs() as f64) / 2.0
}

/// Euclidean distance between two rectangle corners.
fn side_length(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    fn canvas(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([0u8]))
    }

    #[test]
    fn test_wide_bar_is_a_candidate() {
        // A 200x40 bright bar: area 8000 px², aspect 5.0.
        let mut img = canvas(320, 240);
        draw_filled_rect_mut(&mut img, Rect::at(60, 100).of_size(200, 40), Luma([255u8]));

        let analyzer = RegionAnalyzer::default();
        let candidates = analyzer.analyze_gray(&img);

        assert!(
            !candidates.is_empty(),
            "expected at least one candidate region"
        );
        let best = candidates
            .iter()
            .max_by(|a, b| a.area.total_cmp(&b.area))
            .unwrap();
        assert!(best.aspect_ratio >= 2.5 && best.aspect_ratio <= 8.0);
        assert!(best.area >= 1000.0);
    }

    #[test]
    fn test_square_is_rejected() {
        // A 100x100 square has aspect ~1.0, outside the silhouette gate.
        let mut img = canvas(320, 240);
        draw_filled_rect_mut(&mut img, Rect::at(110, 70).of_size(100, 100), Luma([255u8]));

        let analyzer = RegionAnalyzer::default();
        assert!(analyzer.analyze_gray(&img).is_empty());
    }

    #[test]
    fn test_small_noise_is_rejected() {
        // Tiny specks stay under the area floor even with barcode aspect.
        let mut img = canvas(320, 240);
        draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(30, 6), Luma([255u8]));

        let analyzer = RegionAnalyzer::default();
        assert!(analyzer.analyze_gray(&img).is_empty());
    }

    #[test]
    fn test_blank_frame_yields_nothing() {
        let analyzer = RegionAnalyzer::default();
        assert!(analyzer.analyze_gray(&canvas(320, 240)).is_empty());
        assert!(analyzer.analyze(&Frame::empty()).is_empty());
    }

    #[test]
    fn test_shoelace_area() {
        let square = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_eq!(contour_area(&square), 100.0);
        assert_eq!(contour_area(&square[..2]), 0.0);
    }
}
