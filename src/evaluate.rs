/// Objective supplied by the caller.
///
/// `evaluate` receives the current point, the caller's context, and the
/// trial step of the line search that produced the point. It must write the
/// gradient into `g`, which has the same length as `x`, and return the
/// objective value. The context is forwarded untouched; the optimizer never
/// inspects it.
///
/// Any closure `FnMut(&mut C, &[T], &mut [T], T) -> T` is an evaluator.
pub trait Evaluate<C, T> {
    fn evaluate(&mut self, ctx: &mut C, x: &[T], g: &mut [T], step: T) -> T;
}

impl<C, T, F> Evaluate<C, T> for F
where
    F: FnMut(&mut C, &[T], &mut [T], T) -> T,
{
    fn evaluate(&mut self, ctx: &mut C, x: &[T], g: &mut [T], step: T) -> T {
        self(ctx, x, g, step)
    }
}
