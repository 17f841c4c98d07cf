// ABOUTME: Diagnostics accumulator for non-fatal warnings during lifecycle operations.
// ABOUTME: Collects warnings that shouldn't fail a command but should be shown to users.

/// Collects non-fatal warnings during lifecycle operations.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a command.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The container could not be stopped or removed during `clean`.
    pub fn stop(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Stop,
            message: message.into(),
        }
    }

    /// Create a prune step failure warning.
    pub fn prune(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::Prune,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Removing the container failed; cleanup carried on without it.
    Stop,
    /// One garbage-collection step failed; the others still ran.
    Prune,
}
