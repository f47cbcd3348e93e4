use crate::model::State2D;
use crate::traits::{PhasePlaneSystem, Scalar, Steppable};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One point of an integrated trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

/// Classic Runge-Kutta 4th Order Solver for planar systems.
#[derive(Debug, Default)]
pub struct Rk4;

impl Rk4 {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Scalar> Steppable<T> for Rk4 {
    fn step(&mut self, system: &impl PhasePlaneSystem<T>, t: &mut T, x: &mut T, y: &mut T, dt: T) {
        let half = T::from_f64(0.5).unwrap();
        let sixth = T::from_f64(1.0 / 6.0).unwrap();
        let two = T::from_f64(2.0).unwrap();

        let t0 = *t;
        let (x0, y0) = (*x, *y);

        // k1 = f(y)
        let (k1x, k1y) = system.rates(x0, y0);

        // k2 = f(y + dt*k1/2)
        let (k2x, k2y) = system.rates(x0 + dt * half * k1x, y0 + dt * half * k1y);

        // k3 = f(y + dt*k2/2)
        let (k3x, k3y) = system.rates(x0 + dt * half * k2x, y0 + dt * half * k2y);

        // k4 = f(y + dt*k3)
        let (k4x, k4y) = system.rates(x0 + dt * k3x, y0 + dt * k3y);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        *x = x0 + dt * sixth * (k1x + two * k2x + two * k3x + k4x);
        *y = y0 + dt * sixth * (k1y + two * k2y + two * k3y + k4y);
        *t = t0 + dt;
    }
}

/// Integrates a trajectory from `seed` at t = 0 to t = t_max inclusive with
/// fixed step `dt`.
///
/// The state is clamped non-negative after every accepted step (the model
/// lives on a concentration domain), never at intermediate stage
/// evaluations. The clamp is written as comparisons so a non-finite state
/// propagates through untouched instead of being flushed to zero. If the
/// last full step would overshoot, it is shortened so the final sample's
/// time equals `t_max` exactly.
pub fn integrate_trajectory(
    system: &impl PhasePlaneSystem<f64>,
    seed: State2D,
    t_max: f64,
    dt: f64,
) -> Result<Vec<TrajectorySample>> {
    if !dt.is_finite() || dt <= 0.0 {
        bail!("Step size dt must be positive and finite.");
    }
    if !t_max.is_finite() || t_max < 0.0 {
        bail!("Maximum simulation time must be non-negative and finite.");
    }

    let mut stepper = Rk4::new();
    let mut t = 0.0;
    let mut x = seed.x;
    let mut y = seed.y;
    let mut samples = vec![TrajectorySample { t, x, y }];

    while t < t_max {
        let remaining = t_max - t;
        let h = if dt > remaining { remaining } else { dt };
        stepper.step(system, &mut t, &mut x, &mut y, h);
        if h < dt {
            // Shortened final step: snap so the trajectory ends on t_max
            // exactly rather than within rounding of it.
            t = t_max;
        }
        if x < 0.0 {
            x = 0.0;
        }
        if y < 0.0 {
            y = 0.0;
        }
        samples.push(TrajectorySample { t, x, y });
    }

    Ok(samples)
}
