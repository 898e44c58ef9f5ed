use serde::Deserialize;

use crate::{MAX_STEPS, MAX_VARIABLES_TO_ANALYZE};

/// Limits applied to every analysis run by a [`crate::PassManager`].
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// Functions declaring more variables than this are rejected by the live variable analysis.
    pub max_variables: usize,
    /// Upper bound on worklist steps before the solver gives up.
    pub max_steps: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_variables: MAX_VARIABLES_TO_ANALYZE,
            max_steps: MAX_STEPS,
        }
    }
}
