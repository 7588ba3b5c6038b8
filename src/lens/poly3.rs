//! Single-coefficient cubic model: `r_d = r (1 - k1 + k1 r^2)`.
//!
//! The `1 - k1` term keeps the unit radius fixed.

use crate::lens::{model::RadialProfile, params::ParamDesc};

const PARAMS: &[ParamDesc] = &[ParamDesc::float("k1", 0.0, -1.0, 1.0)];

/// Coefficient of the poly3 model.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Poly3Coefficients {
    /// Cubic coefficient.
    pub k1: f64,
}

impl RadialProfile for Poly3Coefficients {
    fn params(&self) -> &'static [ParamDesc] {
        PARAMS
    }

    fn get(&self, name: &str) -> Option<f64> {
        (name == "k1").then_some(self.k1)
    }

    fn set(&mut self, name: &str, v: f64) -> bool {
        if name != "k1" {
            return false;
        }
        self.k1 = v;
        true
    }

    fn radial(&self, r: f64) -> f64 {
        r * (1.0 - self.k1 + self.k1 * r * r)
    }

    fn radial_derivative(&self, r: f64) -> f64 {
        1.0 - self.k1 + 3.0 * self.k1 * r * r
    }

    fn is_identity(&self) -> bool {
        self.k1 == 0.0
    }
}
