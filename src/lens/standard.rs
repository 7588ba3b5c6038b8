//! Brown-Conrady radial polynomial: `r_d = r (1 + k1 r^2 + k2 r^4 + k3 r^6)`.

use crate::lens::{model::RadialProfile, params::ParamDesc};

const PARAMS: &[ParamDesc] = &[
    ParamDesc::float("k1", 0.0, -1.0, 1.0),
    ParamDesc::float("k2", 0.0, -1.0, 1.0),
    ParamDesc::float("k3", 0.0, -1.0, 1.0),
    ParamDesc::int("iterations", 20, 4, 64),
];

/// Coefficients of the standard radial model.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StandardCoefficients {
    /// Second-order radial coefficient.
    pub k1: f64,
    /// Fourth-order radial coefficient.
    pub k2: f64,
    /// Sixth-order radial coefficient.
    pub k3: f64,
    /// Newton iterations used when inverting.
    pub iterations: u32,
}

impl Default for StandardCoefficients {
    fn default() -> Self {
        Self {
            k1: 0.0,
            k2: 0.0,
            k3: 0.0,
            iterations: 20,
        }
    }
}

impl RadialProfile for StandardCoefficients {
    fn params(&self) -> &'static [ParamDesc] {
        PARAMS
    }

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "k1" => Some(self.k1),
            "k2" => Some(self.k2),
            "k3" => Some(self.k3),
            "iterations" => Some(f64::from(self.iterations)),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, v: f64) -> bool {
        match name {
            "k1" => self.k1 = v,
            "k2" => self.k2 = v,
            "k3" => self.k3 = v,
            "iterations" => self.iterations = v as u32,
            _ => return false,
        }
        true
    }

    fn radial(&self, r: f64) -> f64 {
        let r2 = r * r;
        r * (1.0 + r2 * (self.k1 + r2 * (self.k2 + r2 * self.k3)))
    }

    fn radial_derivative(&self, r: f64) -> f64 {
        let r2 = r * r;
        1.0 + r2 * (3.0 * self.k1 + r2 * (5.0 * self.k2 + r2 * 7.0 * self.k3))
    }

    fn is_identity(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.k3 == 0.0
    }

    fn max_iterations(&self) -> u32 {
        self.iterations
    }
}
