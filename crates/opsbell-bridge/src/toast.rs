/// Severity or category for transient user-visible alerts.
///
/// This enum classifies toasts by their intent so the presentation layer can
/// render them appropriately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    /// Neutral informational message, e.g. a freshly ingested notification.
    Info,
    /// Indicates a successful operation or positive outcome.
    Success,
    /// Indicates a non-critical issue the user should be aware of, such as a
    /// rejected form submission.
    Warning,
    /// Indicates a failed operation, e.g. a transport or REST error.
    Error,
}

/// A transient alert payload intended for the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    /// The kind of the toast, determining its visual style.
    pub kind: ToastKind,
    /// The text content to display to the user.
    pub message: String,
}

impl ToastMessage {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
