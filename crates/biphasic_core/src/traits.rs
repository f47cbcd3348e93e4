use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as scalars by the integrator.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A two-variable autonomous dynamical system on the phase plane.
pub trait PhasePlaneSystem<T: Scalar> {
    /// Evaluates the vector field at (x, y).
    /// Returns (dx/dt, dy/dt).
    fn rates(&self, x: T, y: T) -> (T, T);
}

/// A trait for fixed-step solvers that can advance a planar system.
pub trait Steppable<T: Scalar> {
    /// Performs one step of size dt.
    /// t: current time (updated after step)
    /// x, y: current state (updated after step)
    /// dt: step size
    fn step(&mut self, system: &impl PhasePlaneSystem<T>, t: &mut T, x: &mut T, y: &mut T, dt: T);
}
