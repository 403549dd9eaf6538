use num_traits::Float;
use std::fmt::Debug;

use crate::vector::{add_scaled, diff, dot, scale};

/// One correction pair `s = x_k - x_{k-1}`, `y = g_k - g_{k-1}`.
#[derive(Debug, Clone)]
pub struct Correction<T> {
    s: Vec<T>,
    y: Vec<T>,
    /// `1 / (y · s)`
    rho: T,
    /// `y · y`, kept for the initial Hessian scaling.
    yy: T,
    /// Scratch for the two-loop recursion.
    alpha: T,
}

impl<T: Float> Correction<T> {
    fn zeros(n: usize) -> Self {
        Self {
            s: vec![T::zero(); n],
            y: vec![T::zero(); n],
            rho: T::zero(),
            yy: T::zero(),
            alpha: T::zero(),
        }
    }

    pub fn s(&self) -> &[T] {
        &self.s
    }

    pub fn y(&self) -> &[T] {
        &self.y
    }

    pub fn rho(&self) -> T {
        self.rho
    }
}

/// Bounded history of correction pairs.
///
/// Storage for `m` pairs is allocated once; new pairs overwrite the oldest
/// slot once the buffer is full. A pair is stored only when it satisfies the
/// curvature condition `y · s > 0`, which keeps the implied inverse Hessian
/// positive definite.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<Correction<T>>,
    /// Slot the next accepted pair is written to.
    head: usize,
    len: usize,
}

impl<T> History<T>
where
    T: Float + Debug,
{
    /// Creates an empty history for vectors of length `n` holding at most `m` pairs.
    ///
    /// # Panics
    ///
    /// Panics if `m` is zero.
    pub fn new(m: usize, n: usize) -> Self {
        assert!(m > 0, "history capacity must be positive");
        Self {
            entries: (0..m).map(|_| Correction::zeros(n)).collect(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Stores the pair `(x - xp, g - gp)`.
    ///
    /// Returns `false` and leaves the history untouched when the pair fails
    /// the curvature condition.
    pub fn update(&mut self, x: &[T], xp: &[T], g: &[T], gp: &[T]) -> bool {
        assert_eq!(x.len(), xp.len(), "update: length mismatch");
        assert_eq!(g.len(), gp.len(), "update: length mismatch");
        let (ys, yy) = x
            .iter()
            .zip(xp.iter())
            .zip(g.iter().zip(gp.iter()))
            .fold((T::zero(), T::zero()), |(ys, yy), ((&x_i, &xp_i), (&g_i, &gp_i))| {
                let y_i = g_i - gp_i;
                (ys + y_i * (x_i - xp_i), yy + y_i * y_i)
            });
        if !Self::admissible(ys) {
            return false;
        }

        let slot = &mut self.entries[self.head];
        diff(&mut slot.s, x, xp);
        diff(&mut slot.y, g, gp);
        self.commit(ys, yy);
        true
    }

    /// Stores an explicit pair. Same acceptance rule as [`History::update`].
    pub fn push(&mut self, s: &[T], y: &[T]) -> bool {
        let ys = dot(y, s);
        if !Self::admissible(ys) {
            return false;
        }
        let yy = dot(y, y);
        let slot = &mut self.entries[self.head];
        slot.s.copy_from_slice(s);
        slot.y.copy_from_slice(y);
        self.commit(ys, yy);
        true
    }

    fn admissible(ys: T) -> bool {
        ys > T::zero() && ys.is_finite()
    }

    fn commit(&mut self, ys: T, yy: T) {
        let slot = &mut self.entries[self.head];
        slot.rho = T::one() / ys;
        slot.yy = yy;
        self.head = (self.head + 1) % self.capacity();
        self.len = (self.len + 1).min(self.capacity());
    }

    /// Physical slot of the `i`-th stored pair, counting from the oldest.
    fn slot(&self, i: usize) -> usize {
        let m = self.capacity();
        (self.head + m - self.len + i) % m
    }

    /// Stored pairs from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Correction<T>> + '_ {
        (0..self.len).map(move |i| &self.entries[self.slot(i)])
    }

    /// Two-loop recursion: writes `d = -H g` where `H` is the L-BFGS inverse
    /// Hessian approximation built from the stored pairs.
    ///
    /// The initial matrix is `H0 = (s · y) / (y · y) I` from the newest pair,
    /// or the identity when the history is empty, in which case `d = -g`.
    pub fn two_loop(&mut self, g: &[T], d: &mut [T]) {
        assert_eq!(g.len(), d.len(), "two_loop: length mismatch");
        d.copy_from_slice(g);

        // Newest to oldest.
        for i in (0..self.len).rev() {
            let j = self.slot(i);
            let entry = &mut self.entries[j];
            entry.alpha = entry.rho * dot(&entry.s, d);
            add_scaled(d, -entry.alpha, &entry.y);
        }

        if self.len > 0 {
            let newest = &self.entries[self.slot(self.len - 1)];
            // ys / yy == 1 / (rho * yy)
            let gamma = T::one() / (newest.rho * newest.yy);
            if gamma.is_finite() {
                scale(d, gamma);
            }
        }

        // Oldest to newest.
        for i in 0..self.len {
            let entry = &self.entries[self.slot(i)];
            let beta = entry.rho * dot(&entry.y, d);
            add_scaled(d, entry.alpha - beta, &entry.s);
        }

        d.iter_mut().for_each(|d_i| *d_i = -*d_i);
    }
}
