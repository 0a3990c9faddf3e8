//! Trait definitions for comparison strategies.

/// Decides whether a scored pair counts as a near-duplicate
pub trait ComparisonStrategy: Send + Sync {
    /// Whether a pair with this similarity (in `[0, 1]`) is kept
    fn is_near_duplicate(&self, similarity: f64) -> bool;

    /// The configured threshold
    fn threshold(&self) -> f64;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Keeps pairs whose similarity strictly exceeds a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStrategy {
    threshold: f64,
}

impl ThresholdStrategy {
    /// Default threshold used by the CLI
    pub const DEFAULT_THRESHOLD: f64 = 0.9;

    /// Create a new threshold strategy
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_near_duplicate(&self, similarity: f64) -> bool {
        similarity > self.threshold
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: pairs with similarity above {:.2}% are near-duplicates",
            self.threshold * 100.0
        )
    }
}
