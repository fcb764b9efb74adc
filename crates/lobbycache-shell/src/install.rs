//! Install-prompt handling.
//!
//! The platform defers its install prompt and hands the page an event to
//! replay later. That deferred event is explicit state owned by
//! `InstallPrompt`: the page stores it, reveals the install affordance, and
//! replays it on user action.

use tracing::info;

/// What the user chose when the prompt was replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Accepted,
    Dismissed,
}

impl std::fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallOutcome::Accepted => write!(f, "accepted"),
            InstallOutcome::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// A deferred install event captured from the platform.
///
/// Carries the outcome the platform will report once the prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredPrompt {
    outcome: InstallOutcome,
}

impl DeferredPrompt {
    pub fn new(outcome: InstallOutcome) -> Self {
        Self { outcome }
    }

    /// Show the prompt and report the user's choice.
    fn prompt(self) -> InstallOutcome {
        self.outcome
    }
}

/// Install affordance state for the page.
#[derive(Debug, Default)]
pub struct InstallPrompt {
    deferred: Option<DeferredPrompt>,
}

impl InstallPrompt {
    pub fn new() -> Self {
        Self { deferred: None }
    }

    /// Capture the platform event and reveal the affordance.
    pub fn defer(&mut self, prompt: DeferredPrompt) {
        self.deferred = Some(prompt);
        info!("Install affordance available");
    }

    /// Whether the install affordance should be visible.
    pub fn available(&self) -> bool {
        self.deferred.is_some()
    }

    /// Replay the deferred prompt and report the outcome. `None` when no
    /// prompt is pending.
    pub fn trigger(&mut self) -> Option<InstallOutcome> {
        let outcome = self.deferred.take()?.prompt();
        info!(outcome = %outcome, "Install prompt outcome");
        Some(outcome)
    }

    /// The app was installed; drop any pending prompt.
    pub fn installed(&mut self) {
        self.deferred = None;
        info!("App installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_without_deferred_prompt() {
        let mut prompt = InstallPrompt::new();
        assert!(!prompt.available());
        assert_eq!(prompt.trigger(), None);
    }

    #[test]
    fn test_defer_then_trigger_reports_outcome() {
        let mut prompt = InstallPrompt::new();
        prompt.defer(DeferredPrompt::new(InstallOutcome::Accepted));
        assert!(prompt.available());

        assert_eq!(prompt.trigger(), Some(InstallOutcome::Accepted));
        // The deferred event is consumed by the replay.
        assert!(!prompt.available());
        assert_eq!(prompt.trigger(), None);
    }

    #[test]
    fn test_installed_clears_pending_prompt() {
        let mut prompt = InstallPrompt::new();
        prompt.defer(DeferredPrompt::new(InstallOutcome::Dismissed));
        prompt.installed();
        assert!(!prompt.available());
    }
}
