//! Region selection and the percentage-to-pixel crop placement.
//!
use anyhow::{ensure, Result};

/// Position of the crop window within the frame, as percentages.
///
/// `(0, 0)` pins the window to the top-left corner, `(100, 100)` to the
/// bottom-right, `(50, 50)` centers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSelection {
    x: f32,
    y: f32,
}

impl RegionSelection {
    /// Create a selection, rejecting values outside `[0, 100]`.
    pub fn new(x: f32, y: f32) -> Result<Self> {
        ensure!(
            (0.0..=100.0).contains(&x) && (0.0..=100.0).contains(&y),
            "region selection ({x}, {y}) outside [0, 100]"
        );
        Ok(Self { x, y })
    }

    /// Selection centering the crop window in the frame.
    pub fn centered() -> Self {
        Self { x: 50.0, y: 50.0 }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }
}

/// A square crop window placed at pixel coordinates within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub left: u32,
    pub top: u32,
    pub size: u32,
}

impl CropWindow {
    /// Place a `size`-sided window in a `frame_width` x `frame_height` frame.
    ///
    /// The window origin moves linearly with the selection percentage over
    /// the slack the frame leaves around the window:
    /// `origin = (frame_dim - size) * pct / 100`, rounded to the nearest
    /// pixel. The window therefore always lies fully inside the frame.
    pub fn place(
        frame_width: u32,
        frame_height: u32,
        size: u32,
        region: &RegionSelection,
    ) -> Result<Self> {
        ensure!(
            frame_width >= size && frame_height >= size,
            "frame {frame_width}x{frame_height} smaller than crop size {size}"
        );

        let left = scaled_offset(frame_width - size, region.x());
        let top = scaled_offset(frame_height - size, region.y());

        Ok(Self { left, top, size })
    }
}

fn scaled_offset(slack: u32, pct: f32) -> u32 {
    (slack as f32 * pct / 100.0).round() as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn selection_bounds_are_enforced() {
        assert!(RegionSelection::new(0.0, 100.0).is_ok());
        assert!(RegionSelection::new(-0.1, 50.0).is_err());
        assert!(RegionSelection::new(50.0, 100.1).is_err());
    }

    #[test]
    fn boundary_placements() -> Result<()> {
        let (w, h, size) = (640, 480, 224);

        let top_left = CropWindow::place(w, h, size, &RegionSelection::new(0.0, 0.0)?)?;
        assert_eq!((top_left.left, top_left.top), (0, 0));

        let bottom_right = CropWindow::place(w, h, size, &RegionSelection::new(100.0, 100.0)?)?;
        assert_eq!((bottom_right.left, bottom_right.top), (w - size, h - size));

        let centered = CropWindow::place(w, h, size, &RegionSelection::centered())?;
        assert_eq!((centered.left, centered.top), ((w - size) / 2, (h - size) / 2));

        Ok(())
    }

    #[test]
    fn window_stays_within_frame_for_all_selections() -> Result<()> {
        let (w, h, size) = (640, 480, 224);

        for x in 0..=100 {
            for y in 0..=100 {
                let region = RegionSelection::new(x as f32, y as f32)?;
                let window = CropWindow::place(w, h, size, &region)?;
                assert!(window.left + window.size <= w);
                assert!(window.top + window.size <= h);
            }
        }

        Ok(())
    }

    #[test]
    fn frame_smaller_than_crop_is_rejected() {
        let region = RegionSelection::centered();
        assert!(CropWindow::place(200, 480, 224, &region).is_err());
        assert!(CropWindow::place(640, 200, 224, &region).is_err());
    }
}
