//! Dense vector arithmetic shared by the line searches, the two-loop
//! recursion and the driver.
//!
//! Every routine works on slices of equal length. Passing slices of
//! different lengths is a programming error and panics.

use num_traits::Float;

/// Converts an `f64` literal into `T`.
///
/// The conversion is exact for `f32` and `f64`; a type that cannot represent
/// the literal yields NaN, which the parameter checks reject.
#[inline]
pub(crate) fn lit<T: Float>(v: f64) -> T {
    T::from(v).unwrap_or_else(T::nan)
}

/// Computes the dot product `a · b`.
///
/// # Examples
///
/// ```
/// use lbfgs::vector::dot;
///
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// ```
#[inline]
pub fn dot<T: Float>(a: &[T], b: &[T]) -> T {
    assert_eq!(a.len(), b.len(), "dot: length mismatch");
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&a_i, &b_i)| acc + a_i * b_i)
}

/// Euclidean norm `||x||`. The norm of an empty vector is zero.
#[inline]
pub fn norm2<T: Float>(x: &[T]) -> T {
    dot(x, x).sqrt()
}

/// Reciprocal of the Euclidean norm, or zero for a zero vector.
#[inline]
pub fn norm2_inv<T: Float>(x: &[T]) -> T {
    let norm = norm2(x);
    if norm > T::zero() {
        T::one() / norm
    } else {
        T::zero()
    }
}

/// Computes `result = alpha * x + y`.
#[inline]
pub fn axpy<T: Float>(result: &mut [T], alpha: T, x: &[T], y: &[T]) {
    assert_eq!(result.len(), x.len(), "axpy: length mismatch");
    assert_eq!(x.len(), y.len(), "axpy: length mismatch");
    for ((r, &x_i), &y_i) in result.iter_mut().zip(x.iter()).zip(y.iter()) {
        *r = alpha * x_i + y_i;
    }
}

/// In-place `y += alpha * x`.
#[inline]
pub fn add_scaled<T: Float>(y: &mut [T], alpha: T, x: &[T]) {
    assert_eq!(y.len(), x.len(), "add_scaled: length mismatch");
    for (y_i, &x_i) in y.iter_mut().zip(x.iter()) {
        *y_i = *y_i + alpha * x_i;
    }
}

/// In-place `x *= alpha`.
#[inline]
pub fn scale<T: Float>(x: &mut [T], alpha: T) {
    x.iter_mut().for_each(|x_i| *x_i = *x_i * alpha);
}

/// Copies `src` into `dst`.
#[inline]
pub fn copy<T: Float>(dst: &mut [T], src: &[T]) {
    assert_eq!(dst.len(), src.len(), "copy: length mismatch");
    dst.copy_from_slice(src);
}

/// Computes `z = x - y`.
#[inline]
pub fn diff<T: Float>(z: &mut [T], x: &[T], y: &[T]) {
    assert_eq!(z.len(), x.len(), "diff: length mismatch");
    assert_eq!(x.len(), y.len(), "diff: length mismatch");
    for ((z_i, &x_i), &y_i) in z.iter_mut().zip(x.iter()).zip(y.iter()) {
        *z_i = x_i - y_i;
    }
}
