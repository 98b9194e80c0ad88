//! Coefficient-based bivariate polynomial.

use crate::resample::{Axis, Polynomial2D};

/// A bivariate polynomial as a sum of `c * x^i * y^j` terms.
#[derive(Debug, Clone)]
pub struct Poly2 {
    /// `(i, j, c)` triples.
    terms: Vec<(u32, u32, f64)>,
}

impl Poly2 {
    pub fn new(terms: Vec<(u32, u32, f64)>) -> Self {
        Self { terms }
    }

    /// The identity-in-x polynomial `p(x, y) = x`.
    pub fn identity_x() -> Self {
        Self::new(vec![(1, 0, 1.0)])
    }

    /// The identity-in-y polynomial `p(x, y) = y`.
    pub fn identity_y() -> Self {
        Self::new(vec![(0, 1, 1.0)])
    }
}

impl Polynomial2D for Poly2 {
    fn eval(&self, x: f64, y: f64) -> f64 {
        self.terms
            .iter()
            .map(|&(i, j, c)| c * x.powi(i as i32) * y.powi(j as i32))
            .sum()
    }

    fn derivative(&self, axis: Axis) -> Box<dyn Polynomial2D> {
        let terms = self
            .terms
            .iter()
            .filter_map(|&(i, j, c)| match axis {
                Axis::X if i > 0 => Some((i - 1, j, c * i as f64)),
                Axis::Y if j > 0 => Some((i, j - 1, c * j as f64)),
                _ => None,
            })
            .collect();
        Box::new(Poly2 { terms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_simple_terms() {
        // p(x, y) = 2 + 3x + xy
        let p = Poly2::new(vec![(0, 0, 2.0), (1, 0, 3.0), (1, 1, 1.0)]);
        assert_eq!(p.eval(0.0, 0.0), 2.0);
        assert_eq!(p.eval(2.0, 5.0), 2.0 + 6.0 + 10.0);
    }

    #[test]
    fn derivatives() {
        // p(x, y) = x^2 y
        let p = Poly2::new(vec![(2, 1, 1.0)]);
        let dx = p.derivative(Axis::X);
        let dy = p.derivative(Axis::Y);
        // dp/dx = 2xy, dp/dy = x^2
        assert_eq!(dx.eval(3.0, 4.0), 24.0);
        assert_eq!(dy.eval(3.0, 4.0), 9.0);
    }

    #[test]
    fn derivative_of_constant_is_zero() {
        let p = Poly2::new(vec![(0, 0, 7.0)]);
        let dx = p.derivative(Axis::X);
        assert_eq!(dx.eval(100.0, -3.0), 0.0);
    }
}
