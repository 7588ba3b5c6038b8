//! Equidistant fisheye: `theta = atan(r)`,
//! `r_d = theta (1 + k1 theta^2 + k2 theta^4 + k3 theta^6 + k4 theta^8)`.
//!
//! Even with all coefficients at zero this is the equidistant projection, not the identity.

use crate::lens::{model::RadialProfile, params::ParamDesc};

const PARAMS: &[ParamDesc] = &[
    ParamDesc::float("k1", 0.0, -1.0, 1.0),
    ParamDesc::float("k2", 0.0, -1.0, 1.0),
    ParamDesc::float("k3", 0.0, -1.0, 1.0),
    ParamDesc::float("k4", 0.0, -1.0, 1.0),
];

/// Coefficients of the fisheye model.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FisheyeCoefficients {
    /// Coefficient of `theta^3`.
    pub k1: f64,
    /// Coefficient of `theta^5`.
    pub k2: f64,
    /// Coefficient of `theta^7`.
    pub k3: f64,
    /// Coefficient of `theta^9`.
    pub k4: f64,
}

impl RadialProfile for FisheyeCoefficients {
    fn params(&self) -> &'static [ParamDesc] {
        PARAMS
    }

    fn get(&self, name: &str) -> Option<f64> {
        match name {
            "k1" => Some(self.k1),
            "k2" => Some(self.k2),
            "k3" => Some(self.k3),
            "k4" => Some(self.k4),
            _ => None,
        }
    }

    fn set(&mut self, name: &str, v: f64) -> bool {
        match name {
            "k1" => self.k1 = v,
            "k2" => self.k2 = v,
            "k3" => self.k3 = v,
            "k4" => self.k4 = v,
            _ => return false,
        }
        true
    }

    fn radial(&self, r: f64) -> f64 {
        let theta = r.atan();
        let t2 = theta * theta;
        theta * (1.0 + t2 * (self.k1 + t2 * (self.k2 + t2 * (self.k3 + t2 * self.k4))))
    }

    fn radial_derivative(&self, r: f64) -> f64 {
        let theta = r.atan();
        let t2 = theta * theta;
        let d_theta = 1.0
            + t2 * (3.0 * self.k1 + t2 * (5.0 * self.k2 + t2 * (7.0 * self.k3 + t2 * 9.0 * self.k4)));
        d_theta / (1.0 + r * r)
    }

    fn is_identity(&self) -> bool {
        false
    }
}
