//! Decoded pattern data passed from decoding to triangulation.
//!
//! A decoder fills one [`DecodedPattern`] per capture: fringe correspondences
//! grouped by pattern/row id plus the intermediate images it produced. The
//! estimated point count is derived from the correspondences and kept in
//! sync by every mutation path.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use image::{GrayImage, ImageBuffer, Luma};

/// 2D image position of a fringe point.
pub type FringePoint = [f32; 2];

/// Floating point single channel image (decoded projector coordinates).
pub type DecodedImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Decoded pattern shared read-only with triangulation.
pub type SharedDecodedPattern = Arc<DecodedPattern>;

/// Result of decoding one capture.
#[derive(Debug, Clone, Default)]
pub struct DecodedPattern {
    fringe_points: BTreeMap<i32, Vec<FringePoint>>,
    estimated_cloud_points: usize,
    /// Average intensity of the capture.
    pub intensity_image: Option<GrayImage>,
    /// Valid pixel mask (non-zero = decoded).
    pub mask_image: Option<GrayImage>,
    /// Decoded projector coordinate per pixel.
    pub decoded_image: Option<DecodedImage>,
    /// Fringe overlay for debugging.
    pub fringe_image: Option<GrayImage>,
}

impl DecodedPattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Correspondences grouped by pattern id.
    pub fn fringe_points(&self) -> &BTreeMap<i32, Vec<FringePoint>> {
        &self.fringe_points
    }

    /// Mutable access to the correspondences. The point count is refreshed
    /// when the returned guard is dropped.
    pub fn fringe_points_mut(&mut self) -> FringePointsMut<'_> {
        FringePointsMut { pattern: self }
    }

    pub fn add_point(&mut self, pattern_id: i32, point: FringePoint) {
        self.fringe_points.entry(pattern_id).or_default().push(point);
        self.estimated_cloud_points += 1;
    }

    pub fn insert_points(&mut self, pattern_id: i32, points: Vec<FringePoint>) {
        self.fringe_points.insert(pattern_id, points);
        self.update_point_count();
    }

    pub fn clear_points(&mut self) {
        self.fringe_points.clear();
        self.update_point_count();
    }

    /// Recompute the point count from the correspondences.
    pub fn update_point_count(&mut self) {
        self.estimated_cloud_points = self.fringe_points.values().map(Vec::len).sum();
    }

    /// Number of points triangulation can produce from this capture.
    pub fn estimated_cloud_points(&self) -> usize {
        self.estimated_cloud_points
    }

    pub fn is_empty(&self) -> bool {
        self.estimated_cloud_points == 0
    }

    pub fn into_shared(self) -> SharedDecodedPattern {
        Arc::new(self)
    }
}

/// Write access to [`DecodedPattern`] correspondences.
pub struct FringePointsMut<'a> {
    pattern: &'a mut DecodedPattern,
}

impl Deref for FringePointsMut<'_> {
    type Target = BTreeMap<i32, Vec<FringePoint>>;

    fn deref(&self) -> &Self::Target {
        &self.pattern.fringe_points
    }
}

impl DerefMut for FringePointsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.pattern.fringe_points
    }
}

impl Drop for FringePointsMut<'_> {
    fn drop(&mut self) {
        self.pattern.update_point_count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_tracks_points() {
        let mut pattern = DecodedPattern::new();
        assert!(pattern.is_empty());

        pattern.add_point(3, [1.0, 2.0]);
        pattern.add_point(3, [1.5, 2.0]);
        pattern.add_point(-1, [0.0, 0.0]);
        pattern.insert_points(7, vec![[4.0, 4.0]; 5]);
        assert_eq!(pattern.estimated_cloud_points(), 8);

        // Replacing a row drops its previous points from the count
        pattern.insert_points(3, vec![[9.0, 9.0]]);
        assert_eq!(pattern.estimated_cloud_points(), 7);

        pattern.clear_points();
        assert_eq!(pattern.estimated_cloud_points(), 0);
        assert!(pattern.fringe_points().is_empty());
    }

    #[test]
    fn test_guard_refreshes_count() {
        let mut pattern = DecodedPattern::new();
        {
            let mut points = pattern.fringe_points_mut();
            points.insert(0, vec![[0.0, 0.0]; 4]);
            points.entry(1).or_default().push([1.0, 1.0]);
        }
        assert_eq!(pattern.estimated_cloud_points(), 5);

        pattern.fringe_points_mut().remove(&0);
        assert_eq!(pattern.estimated_cloud_points(), 1);
    }

    #[test]
    fn test_images_are_optional() {
        let mut pattern = DecodedPattern::new();
        assert!(pattern.intensity_image.is_none());
        pattern.mask_image = Some(GrayImage::new(4, 3));
        pattern.decoded_image = Some(DecodedImage::new(4, 3));
        let shared = pattern.into_shared();
        assert_eq!(shared.mask_image.as_ref().map(|m| m.dimensions()), Some((4, 3)));
        assert!(shared.is_empty());
    }
}
