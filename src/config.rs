use crate::constants::{REPORT_PERIOD, UCB1_EXPLORATION};

/// Runtime tuning for the search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// UCB1 exploration constant
    pub exploration: f64,

    /// Iterations between progress trace events (0 disables them)
    pub report_period: u64,
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the UCB1 exploration constant
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration = c;
        self
    }

    /// Set the progress report period
    pub fn with_report_period(mut self, period: u64) -> Self {
        self.report_period = period;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration: UCB1_EXPLORATION,
            report_period: REPORT_PERIOD,
        }
    }
}
