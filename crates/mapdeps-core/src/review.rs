//! Warnings for dependencies that need a human to look at them.

/// Ordered warning messages. Nothing is deduplicated or dropped.
#[derive(Debug, Clone, Default)]
pub struct ReviewLog {
    warnings: Vec<String>,
}

impl ReviewLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(warning = %message, "Manual review");
        self.warnings.push(message);
    }

    /// True once any warning has been recorded.
    pub fn needs_review(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}
