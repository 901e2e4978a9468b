//! The display-side capability consumed by task runners.

/// A view that can show busy and error state.
///
/// Implemented by whatever owns the on-screen widgets. All methods are only
/// ever called on the UI thread.
pub trait ViewSurface: Send + Sync {
    /// Show or hide the busy indicator.
    fn set_busy(&self, busy: bool);

    /// Show a short, user-facing error message.
    fn show_error(&self, message: &str);

    /// Request a repaint after data changed.
    fn repaint(&self) {}
}
