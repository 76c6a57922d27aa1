//! Parametric correction curves.
//!
//! A curve is a closed-form 1-D function of one kinematic variable. The forms
//! cover what the fake-factor fits produce: constants, polynomials, a
//! saturating exponential, and tabulated graphs.
//!
//! `range` is the domain the curve was fitted on. It is kept for reporting only;
//! evaluation outside it extrapolates the functional form exactly like the
//! fitting framework does.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Functional form and parameters of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum CurveForm {
    /// `value`
    Constant { value: f64 },
    /// `c0 + c1·x + c2·x² + ...`
    Polynomial { coefficients: Vec<f64> },
    /// `p0 + p1·exp(p2·x)`
    Exponential { p0: f64, p1: f64, p2: f64 },
    /// Piecewise-linear through `(x[i], y[i])`, flat beyond the end points.
    Graph { x: Vec<f64>, y: Vec<f64> },
}

impl CurveForm {
    pub fn kind(&self) -> &'static str {
        match self {
            CurveForm::Constant { .. } => "constant",
            CurveForm::Polynomial { .. } => "polynomial",
            CurveForm::Exponential { .. } => "exponential",
            CurveForm::Graph { .. } => "graph",
        }
    }
}

/// One immutable, named correction curve.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionCurve {
    name: String,
    form: CurveForm,
    range: Option<(f64, f64)>,
}

impl CorrectionCurve {
    /// Build a curve, rejecting parameter sets that cannot be evaluated.
    pub fn new(name: impl Into<String>, form: CurveForm, range: Option<(f64, f64)>) -> Result<Self, EngineError> {
        let name = name.into();
        validate_form(&name, &form)?;
        if let Some((lo, hi)) = range {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(EngineError::config(format!(
                    "curve '{name}': invalid range [{lo}, {hi}]"
                )));
            }
        }
        Ok(Self { name, form, range })
    }

    /// Shorthand for a constant curve.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            form: CurveForm::Constant { value },
            range: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn form(&self) -> &CurveForm {
        &self.form
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    /// Evaluate the curve at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        match &self.form {
            CurveForm::Constant { value } => *value,
            CurveForm::Polynomial { coefficients } => {
                // Horner, highest order first.
                coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
            }
            CurveForm::Exponential { p0, p1, p2 } => p0 + p1 * (p2 * x).exp(),
            CurveForm::Graph { x: xs, y: ys } => interpolate(xs, ys, x),
        }
    }
}

fn validate_form(name: &str, form: &CurveForm) -> Result<(), EngineError> {
    let finite = |v: &f64| v.is_finite();
    let ok = match form {
        CurveForm::Constant { value } => value.is_finite(),
        CurveForm::Polynomial { coefficients } => !coefficients.is_empty() && coefficients.iter().all(finite),
        CurveForm::Exponential { p0, p1, p2 } => [p0, p1, p2].into_iter().all(finite),
        CurveForm::Graph { x, y } => {
            !x.is_empty()
                && x.len() == y.len()
                && x.iter().chain(y.iter()).all(finite)
                && x.windows(2).all(|w| w[0] < w[1])
        }
    };
    if ok {
        Ok(())
    } else {
        Err(EngineError::config(format!(
            "curve '{name}': invalid {} parameters",
            form.kind()
        )))
    }
}

/// Linear interpolation over strictly increasing `xs`, clamped to the end values.
fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    // First index with xs[i] > x; guaranteed in 1..n here.
    let i = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn polynomial_uses_ascending_coefficients() {
        let c = CorrectionCurve::new(
            "p",
            CurveForm::Polynomial {
                coefficients: vec![1.0, 2.0, 3.0],
            },
            None,
        )
        .unwrap();
        // 1 + 2*2 + 3*4
        assert_relative_eq!(c.evaluate(2.0), 17.0);
    }

    #[test]
    fn exponential_form() {
        let c = CorrectionCurve::new(
            "e",
            CurveForm::Exponential {
                p0: 0.1,
                p1: 0.5,
                p2: -0.05,
            },
            Some((20.0, 100.0)),
        )
        .unwrap();
        assert_relative_eq!(c.evaluate(40.0), 0.1 + 0.5 * (-2.0f64).exp());
        // The fitted range is metadata, evaluation extrapolates.
        assert_relative_eq!(c.evaluate(200.0), 0.1 + 0.5 * (-10.0f64).exp());
    }

    #[test]
    fn graph_interpolates_and_clamps() {
        let c = CorrectionCurve::new(
            "g",
            CurveForm::Graph {
                x: vec![0.0, 10.0, 20.0],
                y: vec![1.0, 2.0, 0.0],
            },
            None,
        )
        .unwrap();
        assert_relative_eq!(c.evaluate(5.0), 1.5);
        assert_relative_eq!(c.evaluate(15.0), 1.0);
        assert_relative_eq!(c.evaluate(10.0), 2.0);
        assert_relative_eq!(c.evaluate(-3.0), 1.0);
        assert_relative_eq!(c.evaluate(99.0), 0.0);
    }

    #[test]
    fn rejects_bad_parameters() {
        let unsorted = CurveForm::Graph {
            x: vec![0.0, 0.0],
            y: vec![1.0, 2.0],
        };
        assert!(CorrectionCurve::new("g", unsorted, None).is_err());

        let empty = CurveForm::Polynomial { coefficients: vec![] };
        assert!(CorrectionCurve::new("p", empty, None).is_err());

        let c = CurveForm::Constant { value: 1.0 };
        assert!(CorrectionCurve::new("c", c, Some((5.0, 1.0))).is_err());
    }

    #[test]
    fn form_json_is_tagged() {
        let form: CurveForm = serde_json::from_str(r#"{"form":"polynomial","coefficients":[0.2,-0.001]}"#).unwrap();
        assert_eq!(
            form,
            CurveForm::Polynomial {
                coefficients: vec![0.2, -0.001]
            }
        );
    }
}
