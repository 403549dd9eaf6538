//! Orthant-wise limited-memory quasi-Newton (OWL-QN) helpers.
//!
//! OWL-QN minimizes `f(x) + c * sum_{i in start..end} |x_i|`. The penalty is
//! not differentiable at zero, so the driver replaces the gradient by the
//! minimum-norm sub-gradient (the pseudo-gradient), keeps search directions
//! inside the orthant that the pseudo-gradient points away from, and projects
//! trial points back onto the orthant of the current iterate.

use num_traits::Float;
use std::fmt::Debug;

/// L1 penalty `c * |x|_1` restricted to the indices `start..end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orthantwise<T> {
    pub c: T,
    pub start: usize,
    pub end: usize,
}

impl<T> Orthantwise<T>
where
    T: Float + Debug,
{
    pub fn new(c: T, start: usize, end: usize) -> Self {
        Self { c, start, end }
    }

    /// `sum |x_i|` over the penalized range.
    pub fn l1_norm(&self, x: &[T]) -> T {
        x[self.start..self.end]
            .iter()
            .fold(T::zero(), |acc, &x_i| acc + x_i.abs())
    }

    /// `c * sum |x_i|` over the penalized range.
    pub fn penalty(&self, x: &[T]) -> T {
        self.c * self.l1_norm(x)
    }

    /// Writes the pseudo-gradient of `f + penalty` at `x` into `pg`.
    ///
    /// Away from zero the penalty is smooth and contributes `c * sign(x_i)`.
    /// At `x_i == 0` the right derivative `g_i + c` is used when it is
    /// negative, the left derivative `g_i - c` when it is positive, and zero
    /// otherwise, since zero is then stationary along that coordinate.
    pub fn pseudo_gradient(&self, pg: &mut [T], x: &[T], g: &[T]) {
        assert_eq!(pg.len(), x.len(), "pseudo_gradient: length mismatch");
        assert_eq!(x.len(), g.len(), "pseudo_gradient: length mismatch");
        pg.copy_from_slice(g);
        for i in self.start..self.end {
            pg[i] = if x[i] < T::zero() {
                g[i] - self.c
            } else if x[i] > T::zero() {
                g[i] + self.c
            } else if g[i] < -self.c {
                g[i] + self.c
            } else if self.c < g[i] {
                g[i] - self.c
            } else {
                T::zero()
            };
        }
    }

    /// Zeroes every penalized component of `d` that does not point against
    /// the pseudo-gradient.
    pub fn constrain_direction(&self, d: &mut [T], pg: &[T]) {
        for i in self.start..self.end {
            if d[i] * pg[i] >= T::zero() {
                d[i] = T::zero();
            }
        }
    }

    /// Orthant to search in: the sign pattern of `xp`, with zero coordinates
    /// taking the sign of the steepest descent direction `-pg`.
    pub fn orthant(&self, wp: &mut [T], xp: &[T], pg: &[T]) {
        for (i, w) in wp.iter_mut().enumerate() {
            *w = if xp[i] == T::zero() { -pg[i] } else { xp[i] };
        }
    }

    /// Clamps to zero every penalized coordinate of `x` that left the orthant `wp`.
    pub fn project(&self, x: &mut [T], wp: &[T]) {
        for i in self.start..self.end {
            if x[i] * wp[i] <= T::zero() {
                x[i] = T::zero();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_penalty_respects_range() {
        let owl = Orthantwise::new(2.0, 1, 3);
        let x = [-10.0, -1.0, 2.0, 100.0];
        assert_eq!(owl.l1_norm(&x), 3.0);
        assert_eq!(owl.penalty(&x), 6.0);
    }

    #[test]
    fn test_pseudo_gradient_sign_rules() {
        let owl = Orthantwise::new(1.0, 0, 5);
        let x = [1.0, -1.0, 0.0, 0.0, 0.0];
        let g = [0.5, 0.5, -3.0, 3.0, 0.5];
        let mut pg = [0.0; 5];
        owl.pseudo_gradient(&mut pg, &x, &g);
        assert_eq!(pg, [1.5, -0.5, -2.0, 2.0, 0.0]);
    }

    #[test]
    fn test_pseudo_gradient_outside_range_is_raw_gradient() {
        let owl = Orthantwise::new(1.0, 1, 2);
        let x = [2.0, 2.0, 2.0];
        let g = [0.25, 0.25, 0.25];
        let mut pg = [0.0; 3];
        owl.pseudo_gradient(&mut pg, &x, &g);
        assert_eq!(pg, [0.25, 1.25, 0.25]);
    }

    #[test]
    fn test_constrain_direction() {
        let owl = Orthantwise::new(1.0, 0, 2);
        let mut d = [1.0, -1.0, 1.0];
        let pg = [-1.0, -1.0, 5.0];
        owl.constrain_direction(&mut d, &pg);
        // d[1] agrees with pg; d[2] is outside the penalized range.
        assert_eq!(d, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_project_clamps_sign_changes() {
        let owl = Orthantwise::new(1.0, 0, 3);
        let xp = [1.0, -1.0, 0.0];
        let pg = [0.0, 0.0, 2.0];
        let mut wp = [0.0; 3];
        owl.orthant(&mut wp, &xp, &pg);
        assert_eq!(wp, [1.0, -1.0, -2.0]);

        let mut x = [-0.5, -0.5, -0.1];
        owl.project(&mut x, &wp);
        assert_eq!(x, [0.0, -0.5, -0.1]);
    }
}
