//! The scalar-function abstraction every integrator and fitter consumes.

/// A real function of one real variable, evaluated on demand.
///
/// Implemented for every `Fn(f64) -> f64`, so closures can be passed directly.
pub trait ScalarFunction {
    fn value(&self, x: f64) -> f64;
}

impl<F: Fn(f64) -> f64> ScalarFunction for F {
    fn value(&self, x: f64) -> f64 {
        self(x)
    }
}
