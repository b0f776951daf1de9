//! Numerical tolerances used by the analysis.

use serde::{Deserialize, Serialize};

/// Options for a truss analysis.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use truss2d::SolverSettings;
///
/// let settings: SolverSettings = serde_json::from_str(r#"{ "reaction_snap": 1e-6 }"#).unwrap();
/// assert_eq!(settings.reaction_snap, 1e-6);
/// assert_eq!(settings.regularization, 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Added to every diagonal entry of the global stiffness matrix.
    pub regularization: f64,
    /// Reaction components smaller than this are reported as exactly zero.
    pub reaction_snap: f64,
    /// Members whose force magnitude is below this are labelled zero-force.
    pub zero_force_threshold: f64,
    /// Largest share of the biggest free load that may fall on a mechanism of
    /// the structure before the system is declared singular.
    pub mechanism_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            regularization: 1e-9,
            reaction_snap: 1e-5,
            zero_force_threshold: 1e-3,
            mechanism_tolerance: 1e-4,
        }
    }
}

impl SolverSettings {
    /// Set the diagonal regularization.
    #[must_use]
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the reaction noise floor.
    #[must_use]
    pub fn with_reaction_snap(mut self, reaction_snap: f64) -> Self {
        self.reaction_snap = reaction_snap;
        self
    }

    /// Set the zero-force labelling threshold.
    #[must_use]
    pub fn with_zero_force_threshold(mut self, threshold: f64) -> Self {
        self.zero_force_threshold = threshold;
        self
    }

    /// Set the mechanism detection tolerance.
    #[must_use]
    pub fn with_mechanism_tolerance(mut self, tolerance: f64) -> Self {
        self.mechanism_tolerance = tolerance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings: SolverSettings = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(settings, SolverSettings::default());
    }

    #[test]
    fn builders_override_single_fields() {
        let settings = SolverSettings::default()
            .with_zero_force_threshold(0.5)
            .with_mechanism_tolerance(1e-2);
        assert_eq!(settings.zero_force_threshold, 0.5);
        assert_eq!(settings.mechanism_tolerance, 1e-2);
        assert_eq!(settings.regularization, 1e-9);
    }
}
