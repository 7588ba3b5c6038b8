use crate::foundation::error::{WarpError, WarpResult};

/// Numeric type of a lens coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Integer-valued.
    Int,
    /// Real-valued.
    Float,
}

/// A coefficient value.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer value.
    Int(i64),
    /// Real value.
    Float(f64),
}

impl ParamValue {
    /// The value widened to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

/// Declaration of one lens coefficient.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ParamDesc {
    /// Coefficient name, unique within its model.
    pub name: &'static str,
    /// Numeric type.
    pub kind: ParamKind,
    /// Value a freshly created model starts with.
    pub default: ParamValue,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl ParamDesc {
    pub(crate) const fn float(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: ParamValue::Float(default),
            min,
            max,
        }
    }

    pub(crate) const fn int(name: &'static str, default: i64, min: i64, max: i64) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: ParamValue::Int(default),
            min: min as f64,
            max: max as f64,
        }
    }

    /// Check that `value` has a compatible type and lies in `[min, max]`, returning it as
    /// `f64`. Integers are accepted for float coefficients; floats for integer coefficients
    /// only when integral.
    pub fn check(&self, value: ParamValue) -> WarpResult<f64> {
        let v = value.as_f64();
        if !v.is_finite() {
            return Err(WarpError::validation(format!(
                "lens parameter '{}' must be finite, got {v}",
                self.name
            )));
        }
        if self.kind == ParamKind::Int && v.fract() != 0.0 {
            return Err(WarpError::validation(format!(
                "lens parameter '{}' must be an integer, got {v}",
                self.name
            )));
        }
        if v < self.min || v > self.max {
            return Err(WarpError::validation(format!(
                "lens parameter '{}' = {v} is outside [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        Ok(v)
    }

    /// Wrap a stored value in this coefficient's type.
    pub fn value(&self, v: f64) -> ParamValue {
        match self.kind {
            ParamKind::Int => ParamValue::Int(v as i64),
            ParamKind::Float => ParamValue::Float(v),
        }
    }
}

/// Which way a lens mapping is applied.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Ideal pinhole coordinates to lens coordinates.
    #[default]
    Distort,
    /// Lens coordinates to ideal pinhole coordinates.
    Undistort,
}

impl Direction {
    /// The opposite direction.
    pub fn inverse(self) -> Self {
        match self {
            Direction::Distort => Direction::Undistort,
            Direction::Undistort => Direction::Distort,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lens/params.rs"]
mod tests;
