//! Mapping of normalized placement coordinates onto page space.
//!
//! Placements are recorded in a top-left origin, row-down space where the
//! whole page spans `0.0..=1.0` on both axes. PDF pages use a bottom-left
//! origin measured in user space units, so the vertical axis is flipped and
//! the box is anchored at its bottom edge.

/// Vertical offset used in place of a box height for text anchors.
pub const TEXT_ANCHOR_OFFSET: f32 = 14.0;

/// Size of the visible page area with the origin of its `/MediaBox`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        PageGeometry {
            origin_x: 0.0,
            origin_y: 0.0,
            width,
            height,
        }
    }

    /// Build from a `[llx, lly, urx, ury]` media box.
    pub fn from_media_box(media_box: [f32; 4]) -> Self {
        let (x1, x2) = if media_box[0] <= media_box[2] {
            (media_box[0], media_box[2])
        } else {
            (media_box[2], media_box[0])
        };
        let (y1, y2) = if media_box[1] <= media_box[3] {
            (media_box[1], media_box[3])
        } else {
            (media_box[3], media_box[1])
        };
        PageGeometry {
            origin_x: x1,
            origin_y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Map a normalized box to absolute page coordinates.
    ///
    /// Returns `None` when any input is not finite.
    pub fn map_box(&self, x_pct: f64, y_pct: f64, w_pct: f64, h_pct: f64) -> Option<Rectangle> {
        if ![x_pct, y_pct, w_pct, h_pct].iter().all(|v| v.is_finite()) {
            return None;
        }
        let (page_w, page_h) = (f64::from(self.width), f64::from(self.height));
        let x = x_pct * page_w;
        let width = w_pct * page_w;
        let height = h_pct * page_h;
        let y_top = y_pct * page_h;
        let y = page_h - y_top - height;
        Some(Rectangle {
            x: self.origin_x + x as f32,
            y: self.origin_y + y as f32,
            width: width as f32,
            height: height as f32,
        })
    }

    /// Map a normalized text anchor to the baseline start of the text.
    pub fn map_text_anchor(&self, x_pct: f64, y_pct: f64) -> Option<(f32, f32)> {
        if !x_pct.is_finite() || !y_pct.is_finite() {
            return None;
        }
        let (page_w, page_h) = (f64::from(self.width), f64::from(self.height));
        let x = x_pct * page_w;
        let y = page_h - y_pct * page_h - f64::from(TEXT_ANCHOR_OFFSET);
        Some((self.origin_x + x as f32, self.origin_y + y as f32))
    }
}

/// Box in PDF user space. `y` is the distance to the bottom edge.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn maps_box_with_flipped_vertical_axis() {
        let page = PageGeometry::new(600.0, 800.0);
        let rect = page.map_box(0.1, 0.1, 0.2, 0.1).unwrap();
        assert!(close(rect.x, 60.0));
        assert!(close(rect.width, 120.0));
        assert!(close(rect.height, 80.0));
        // 800 - 80 - 80
        assert!(close(rect.y, 640.0));
    }

    #[test]
    fn normalized_boxes_stay_inside_the_page() {
        let page = PageGeometry::new(595.28, 841.89);
        let samples = [0.0, 0.13, 0.25, 0.5, 0.77, 1.0];
        for &x in &samples {
            for &y in &samples {
                let w = 1.0 - x;
                let h = 1.0 - y;
                let rect = page.map_box(x, y, w, h).unwrap();
                let expected_y = page.height - y as f32 * page.height - h as f32 * page.height;
                assert!(close(rect.y, expected_y));
                assert!(rect.x >= -EPSILON && rect.right() <= page.width + EPSILON);
                assert!(rect.y >= -EPSILON && rect.top() <= page.height + EPSILON);
            }
        }
    }

    #[test]
    fn out_of_range_boxes_are_mapped_not_rejected() {
        let page = PageGeometry::new(100.0, 100.0);
        let rect = page.map_box(0.9, 0.9, 0.5, 0.5).unwrap();
        assert!(rect.right() > page.width);
        assert!(rect.y < 0.0);
    }

    #[test]
    fn non_finite_input_is_skipped() {
        let page = PageGeometry::new(100.0, 100.0);
        assert!(page.map_box(f64::NAN, 0.1, 0.1, 0.1).is_none());
        assert!(page.map_box(0.1, 0.1, f64::INFINITY, 0.1).is_none());
        assert!(page.map_text_anchor(0.1, f64::NAN).is_none());
    }

    #[test]
    fn text_anchor_uses_fixed_offset() {
        let page = PageGeometry::new(200.0, 400.0);
        let (x, y) = page.map_text_anchor(0.5, 0.25).unwrap();
        assert!(close(x, 100.0));
        assert!(close(y, 400.0 - 100.0 - TEXT_ANCHOR_OFFSET));
    }

    #[test]
    fn media_box_origin_is_respected() {
        let page = PageGeometry::from_media_box([10.0, 20.0, 110.0, 220.0]);
        assert!(close(page.width, 100.0));
        assert!(close(page.height, 200.0));
        let rect = page.map_box(0.0, 0.0, 0.5, 0.5).unwrap();
        assert!(close(rect.x, 10.0));
        assert!(close(rect.y, 120.0));
    }
}
