//! Low-pass filters that turn a jittery target stream into a smooth
//! trajectory.
//!
//! [`Spring`] integrates a damped harmonic oscillator in closed form, so the
//! result does not depend on the frame rate and a critically or over-damped
//! spring released from rest never crosses its target. [`Decay`] is plain
//! exponential smoothing with a single time constant.
//!
//! Both fall back to passing the target straight through when configured
//! with non-positive or non-finite parameters. Non-finite targets are
//! dropped and leave the filter where it was.

use log::debug;
use serde::{Deserialize, Serialize};

/// Distance and speed under which a filter snaps onto its target.
pub const REST_THRESHOLD: f32 = 1e-4;

pub trait Smooth {
    /// Advances by `dt` seconds towards `target` and returns the new value.
    fn step(&mut self, target: f32, dt: f32) -> f32;

    fn value(&self) -> f32;

    /// Jumps straight to `value` with no residual motion.
    fn snap(&mut self, value: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringParams {
    pub stiffness: f32,
    pub damping: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
}

fn default_mass() -> f32 {
    1.0
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            mass: 1.0,
        }
    }
}

impl SpringParams {
    pub fn is_valid(&self) -> bool {
        [self.stiffness, self.damping, self.mass]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }

    /// `damping / (2 * sqrt(stiffness * mass))`; 1 is critical.
    pub fn damping_ratio(&self) -> f32 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

#[derive(Debug, Clone)]
pub struct Spring {
    pub params: SpringParams,
    position: f32,
    velocity: f32,
}

impl Spring {
    pub fn new(params: SpringParams, initial: f32) -> Self {
        if !params.is_valid() {
            debug!("spring parameters {params:?} are degenerate, passing values through");
        }
        Self {
            params,
            position: initial,
            velocity: 0.0,
        }
    }

    /// Critically damped spring of the given stiffness and unit mass.
    pub fn critical(stiffness: f32, initial: f32) -> Self {
        let damping = 2.0 * stiffness.max(0.0).sqrt();
        Self::new(
            SpringParams {
                stiffness,
                damping,
                mass: 1.0,
            },
            initial,
        )
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_settled(&self, target: f32, epsilon: f32) -> bool {
        (self.position - target).abs() <= epsilon && self.velocity.abs() <= epsilon
    }
}

impl Smooth for Spring {
    fn step(&mut self, target: f32, dt: f32) -> f32 {
        if !target.is_finite() {
            return self.position;
        }
        if !self.params.is_valid() {
            self.snap(target);
            return self.position;
        }
        if !(dt.is_finite() && dt > 0.0) {
            return self.position;
        }

        let k = f64::from(self.params.stiffness);
        let c = f64::from(self.params.damping);
        let m = f64::from(self.params.mass);
        let t = f64::from(dt);
        let y0 = f64::from(self.position - target);
        let v0 = f64::from(self.velocity);

        let omega = (k / m).sqrt();
        let zeta = c / (2.0 * (k * m).sqrt());

        let (y, v) = if (zeta - 1.0).abs() < 1e-6 {
            let b = v0 + omega * y0;
            let decay = (-omega * t).exp();
            ((y0 + b * t) * decay, (b - omega * (y0 + b * t)) * decay)
        } else if zeta > 1.0 {
            let root = (zeta * zeta - 1.0).sqrt();
            let r1 = -omega * (zeta - root);
            let r2 = -omega * (zeta + root);
            let c2 = (v0 - r1 * y0) / (r2 - r1);
            let c1 = y0 - c2;
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
        } else {
            let a = zeta * omega;
            let wd = omega * (1.0 - zeta * zeta).sqrt();
            let b = (v0 + a * y0) / wd;
            let decay = (-a * t).exp();
            let (sin, cos) = (wd * t).sin_cos();
            (
                decay * (y0 * cos + b * sin),
                decay * (v0 * cos - (a * b + y0 * wd) * sin),
            )
        };

        self.position = target + y as f32;
        self.velocity = v as f32;
        if (self.position - target).abs() < REST_THRESHOLD && self.velocity.abs() < REST_THRESHOLD {
            self.snap(target);
        }
        self.position
    }

    fn value(&self) -> f32 {
        self.position
    }

    fn snap(&mut self, value: f32) {
        self.position = value;
        self.velocity = 0.0;
    }
}

/// Exponential smoothing: closes `1 - e^(-dt / time_constant)` of the gap
/// each step.
#[derive(Debug, Clone)]
pub struct Decay {
    pub time_constant: f32,
    position: f32,
}

impl Decay {
    pub fn new(time_constant: f32, initial: f32) -> Self {
        Self {
            time_constant,
            position: initial,
        }
    }
}

impl Smooth for Decay {
    fn step(&mut self, target: f32, dt: f32) -> f32 {
        if !target.is_finite() {
            return self.position;
        }
        if !(self.time_constant.is_finite() && self.time_constant > 0.0) {
            self.position = target;
            return self.position;
        }
        if !(dt.is_finite() && dt > 0.0) {
            return self.position;
        }
        let alpha = 1.0 - (-dt / self.time_constant).exp();
        self.position += (target - self.position) * alpha;
        if (self.position - target).abs() < REST_THRESHOLD {
            self.position = target;
        }
        self.position
    }

    fn value(&self) -> f32 {
        self.position
    }

    fn snap(&mut self, value: f32) {
        self.position = value;
    }
}
