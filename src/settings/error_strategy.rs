// Error strategy selection with retry values kept for the session

use crate::config::{ErrorStrategyConfig, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS};

/// Variant picked in the strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStrategyKind {
    Retry,
    Skip,
    Abort,
}

impl ErrorStrategyKind {
    pub fn of(strategy: &ErrorStrategyConfig) -> Self {
        match strategy {
            ErrorStrategyConfig::Retry { .. } => ErrorStrategyKind::Retry,
            ErrorStrategyConfig::Skip => ErrorStrategyKind::Skip,
            ErrorStrategyConfig::Abort => ErrorStrategyKind::Abort,
        }
    }
}

impl std::str::FromStr for ErrorStrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "retry" => Ok(ErrorStrategyKind::Retry),
            "skip" => Ok(ErrorStrategyKind::Skip),
            "abort" => Ok(ErrorStrategyKind::Abort),
            _ => Err(format!("Unknown error strategy '{}'. Use retry, skip or abort", s)),
        }
    }
}

/// Remembers the last retry parameters seen or edited, so switching away
/// from retry and back restores them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorStrategyEditor {
    max_attempts: u32,
    backoff_ms: u64,
}

impl Default for ErrorStrategyEditor {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl ErrorStrategyEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take retry values from a strategy loaded from the backend
    pub fn observe(&mut self, strategy: &ErrorStrategyConfig) {
        if let ErrorStrategyConfig::Retry {
            max_attempts,
            backoff_ms,
        } = *strategy
        {
            self.max_attempts = max_attempts;
            self.backoff_ms = backoff_ms;
        }
    }

    pub fn retry(&self) -> ErrorStrategyConfig {
        ErrorStrategyConfig::Retry {
            max_attempts: self.max_attempts,
            backoff_ms: self.backoff_ms,
        }
    }

    pub fn select(&self, kind: ErrorStrategyKind) -> ErrorStrategyConfig {
        match kind {
            ErrorStrategyKind::Retry => self.retry(),
            ErrorStrategyKind::Skip => ErrorStrategyConfig::Skip,
            ErrorStrategyKind::Abort => ErrorStrategyConfig::Abort,
        }
    }

    pub fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts;
    }

    pub fn set_backoff_ms(&mut self, backoff_ms: u64) {
        self.backoff_ms = backoff_ms;
    }

    /// Strategy to store after a retry value edit. Only a current retry
    /// strategy picks up the new values; skip and abort stay as they are.
    pub fn apply_to(&self, current: &ErrorStrategyConfig) -> Option<ErrorStrategyConfig> {
        match current {
            ErrorStrategyConfig::Retry { .. } => Some(self.retry()),
            ErrorStrategyConfig::Skip | ErrorStrategyConfig::Abort => None,
        }
    }
}
