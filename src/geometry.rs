//! Geometry primitives
//!
//! Pure functions used by the contour generator: sampling a point on a
//! circle and fitting the cubic transition curve that joins a circular
//! far-field arc to the flat top of the domain.
//!
//! All 2D points live in the symmetry plane of the capsule. nalgebra's
//! `Point2` is used with `p.x` the streamwise coordinate and `p.y` holding
//! the vertical `z` coordinate of the mesh.

use nalgebra::Point2;

use crate::defaults::REFERENCE_DIAMETER;

/// Point on a circle of `radius` around `(center_x, center_z)`.
///
/// `angle_degrees` is measured counter-clockwise from the positive x-axis.
/// Zero or negative radii are not rejected.
#[must_use]
pub fn circle(center_x: f64, center_z: f64, radius: f64, angle_degrees: f64) -> Point2<f64> {
    let theta = angle_degrees.to_radians();
    Point2::new(
        center_x + radius * theta.cos(),
        center_z + radius * theta.sin(),
    )
}

/// `n` evenly spaced values from `start` to `end`, both included.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Coefficients of `z(x) = a x^3 + b x^2 + c x + d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl SplineCoefficients {
    /// Solve the transition cubic in closed form.
    ///
    /// The curve leaves the circle point at `x0` (angle `angle0_degrees` on a
    /// circle of `radius` centred on the axis) with the circle's tangent
    /// slope, and reaches `x = 0` at the far-field height
    /// `z_far / 0.4 * diameter` with zero slope. `c` is zero and `d` is the
    /// far-field height, which leaves two linear equations in `a` and `b`.
    ///
    /// `x0` must be non-zero.
    #[must_use]
    pub fn transition(x0: f64, angle0_degrees: f64, radius: f64, diameter: f64, z_far: f64) -> Self {
        let theta0 = angle0_degrees.to_radians();
        let d = (z_far / REFERENCE_DIAMETER) * diameter;
        let b = (3.0 / x0.powi(2))
            * (radius * theta0.sin() + x0 / (3.0 * theta0.tan()) - d);
        let a = (1.0 / (3.0 * x0.powi(2))) * (-1.0 / theta0.tan() - 2.0 * b * x0);

        Self { a, b, c: 0.0, d }
    }

    /// Evaluate the cubic at `x`.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        ((self.a * x + self.b) * x + self.c) * x + self.d
    }

    /// First derivative at `x`.
    #[must_use]
    pub fn slope(&self, x: f64) -> f64 {
        (3.0 * self.a * x + 2.0 * self.b) * x + self.c
    }
}

/// Fit the transition cubic and evaluate it at each of `target_xs`.
///
/// See [`SplineCoefficients::transition`] for the constraints.
#[must_use]
pub fn fit_spline(
    x0: f64,
    target_xs: &[f64],
    angle0_degrees: f64,
    radius: f64,
    diameter: f64,
    z_far: f64,
) -> Vec<f64> {
    let spline = SplineCoefficients::transition(x0, angle0_degrees, radius, diameter, z_far);
    target_xs.iter().map(|&x| spline.eval(x)).collect()
}
