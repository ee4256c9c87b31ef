//! Configuration types deserialized from `kairos.toml`.

use serde::Deserialize;

/// The top-level analysis configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Traversal settings.
    #[serde(default)]
    pub analysis: TraversalConfig,
    /// Post-analysis reporting settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// How the timing graph is walked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TraversalConfig {
    /// Which traversal strategy to use.
    #[serde(default)]
    pub walker: WalkerKind,
    /// Worker thread count for the parallel walker.
    ///
    /// `None` uses rayon's global pool. Ignored by the serial walker.
    pub threads: Option<usize>,
}

/// Traversal strategy.
#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalkerKind {
    /// One thread, levels and nodes in deterministic order (default).
    #[default]
    Serial,
    /// All nodes of a level visited concurrently, levels in order.
    Parallel,
}

/// What the analyzer reports after each analysis run.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Number of critical paths extracted per check type.
    #[serde(default = "default_max_critical_paths")]
    pub max_critical_paths: usize,
    /// Whether unconstrained startpoints/endpoints produce warnings.
    #[serde(default = "default_true")]
    pub warn_unconstrained: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_critical_paths: default_max_critical_paths(),
            warn_unconstrained: true,
        }
    }
}

fn default_max_critical_paths() -> usize {
    10
}

fn default_true() -> bool {
    true
}
