//! Transient user notifications (the toast analog).

/// A sink for transient, non-persisted user notifications.
///
/// The pipeline reports ephemeral outcomes ("Example workbook loaded,
/// retrying...", "Agent failed") through this trait; persisted outcomes go
/// into the conversation log instead. Implementations must not influence
/// pipeline behavior.
pub trait Notifier: Send + Sync {
    /// Surfaces a transient success notification.
    fn success(&self, message: &str);

    /// Surfaces a transient error notification.
    fn error(&self, message: &str);
}

/// A notifier that discards everything, for headless use and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn success(&self, _message: &str) {}

    fn error(&self, _message: &str) {}
}
