//! Transient error banner.
//!
//! Every user-visible failure funnels through [`Notifier::report`]: the error
//! is logged with its stable code and its message replaces whatever the
//! banner was showing. The banner stays until dismissed.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use crate::error::ErrorCode;
use crate::state::ui::UiStore;

#[derive(Clone)]
pub struct Notifier {
    ui: UiStore,
}

impl Notifier {
    #[must_use]
    pub fn new(ui: UiStore) -> Self {
        Self { ui }
    }

    /// Log `err` and show it in the banner.
    pub fn report<E: ErrorCode + ?Sized>(&self, operation: &str, err: &E) {
        tracing::error!(
            operation,
            code = err.error_code(),
            retryable = err.retryable(),
            error = %err,
            "operation failed"
        );
        let message = err.to_string();
        self.ui.update(|ui| ui.error_message = Some(message));
    }

    pub fn dismiss(&self) {
        self.ui.update_if(|ui| ui.error_message.take().is_some());
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.ui.with(|ui| ui.error_message.clone())
    }
}
