pub mod field;
pub mod fixed_points;
pub mod model;
pub mod nullcline;
/// The `biphasic_core` crate is the numerical engine behind the biphasic
/// switch phase-plane explorer. It is deliberately UI-free: it accepts a
/// parameter set, plot domain, and solver config and returns numeric
/// datasets ready for plotting.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `PhasePlaneSystem`
///   (two-variable vector fields), `Steppable` (fixed-step solvers).
/// - **Model**: the mutual-repression ODE right-hand side and its
///   parameters.
/// - **Solvers**: fixed-step RK4 and trajectory integration on the
///   non-negative concentration domain.
/// - **Field / Fixed points / Nullclines**: grid sampling of the vector
///   field, threshold-based fixed-point detection, and marching-squares
///   zero-contour extraction.
/// - **Session**: the orchestrator that recomputes and publishes the
///   result bundle as inputs change.
pub mod session;
pub mod solvers;
pub mod traits;
