// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a square-pixelled window onto the complex plane described by a
//! center and a range.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the x, y of a cell in the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps cells of the integral plane onto the complex plane.  The
/// longer pixel axis spans the full `range` on either side of the
/// center; the shorter axis gets proportionally less, so pixels stay
/// square no matter the aspect ratio.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// Width and height of the grid, in cells.
    pub integral_plane: IntegralPlane,
    /// Center of the window on the complex plane.
    pub center: Complex<f64>,
    /// Half-width of the longer axis, in plane units.
    pub range: f64,
    // Plane coordinate of cell (0, 0).
    min_value: Complex<f64>,
    // Plane distance between neighbouring cells, on either axis.
    increment: f64,
    // Half-extents along the real and imaginary axes.
    half_extent: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane, and the
    /// center and range of the window onto the complex plane.
    pub fn new(width: usize, height: usize, center: Complex<f64>, range: f64) -> PlaneMapper {
        let (w, h) = (width as f64, height as f64);
        let (half_extent, increment) = if width > height {
            ((range, range * h / w), 2.0 * range / w)
        } else {
            ((range * w / h, range), 2.0 * range / h)
        };
        PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            center,
            range,
            min_value: Complex::new(center.re - half_extent.0, center.im - half_extent.1),
            increment,
            half_extent,
        }
    }

    /// The plane coordinate of the first cell.
    pub fn min_value(&self) -> Complex<f64> {
        self.min_value
    }

    /// The plane coordinate of the last cell.  One increment short of
    /// `center + extent`, because cells are sampled at their corner.
    pub fn max_value(&self) -> Complex<f64> {
        Complex::new(
            self.min_value.re + 2.0 * self.half_extent.0 - self.increment,
            self.min_value.im + 2.0 * self.half_extent.1 - self.increment,
        )
    }

    /// Distance between neighbouring cells, in plane units.
    pub fn increment(&self) -> f64 {
        self.increment
    }

    /// Given a pixel on the integral cartesian plane, map it to its
    /// point on the complex cartesian plane.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.min_value.re + (pixel.0 as f64) * self.increment,
            self.min_value.im + (pixel.1 as f64) * self.increment,
        )
    }

    /// Given a complex number corresponding to a location on the
    /// complex cartesian plane, find the nearest cell, or None if the
    /// point lies outside the grid.
    pub fn point_to_pixel(&self, point: &Complex<f64>) -> Option<Pixel> {
        let left = ((point.re - self.min_value.re) / self.increment).round();
        let top = ((point.im - self.min_value.im) / self.increment).round();
        if left < 0.0
            || top < 0.0
            || left >= (self.integral_plane.0 as f64)
            || top >= (self.integral_plane.1 as f64)
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_planes_span_the_full_range_both_ways() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 2.0);
        assert_eq!(pm.min_value(), Complex::new(-2.0, -2.0));
        assert_eq!(pm.max_value(), Complex::new(1.0, 1.0));
        assert_eq!(pm.increment(), 1.0);
    }

    #[test]
    fn wide_planes_shrink_the_imaginary_axis() {
        let pm = PlaneMapper::new(8, 4, Complex::new(1.0, 1.0), 2.0);
        assert_eq!(pm.min_value(), Complex::new(-1.0, 0.0));
        assert_eq!(pm.increment(), 0.5);
        assert_eq!(pm.max_value(), Complex::new(2.5, 1.5));
    }

    #[test]
    fn tall_planes_shrink_the_real_axis() {
        let pm = PlaneMapper::new(4, 8, Complex::new(0.0, 0.0), 2.0);
        assert_eq!(pm.min_value(), Complex::new(-1.0, -2.0));
        assert_eq!(pm.increment(), 0.5);
    }

    #[test]
    fn pixel_to_point_walks_by_increment() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 2.0);
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 1)), Complex::new(1.0, -1.0));
    }

    #[test]
    fn point_to_pixel_inverts_pixel_to_point() {
        let pm = PlaneMapper::new(640, 480, Complex::new(-0.5, 0.25), 1.5);
        for &(x, y) in &[(0, 0), (320, 240), (639, 479), (17, 403)] {
            let point = pm.pixel_to_point(&Pixel(x, y));
            assert_eq!(pm.point_to_pixel(&point), Some(Pixel(x, y)));
        }
    }

    #[test]
    fn point_to_pixel_rejects_points_off_the_grid() {
        let pm = PlaneMapper::new(4, 4, Complex::new(0.0, 0.0), 2.0);
        assert_eq!(pm.point_to_pixel(&Complex::new(-3.0, 0.0)), None);
        assert_eq!(pm.point_to_pixel(&Complex::new(0.0, 2.0)), None);
    }
}
