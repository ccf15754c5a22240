//! Generic user-facing failure messages.

pub const PROCESSING_FAILED: &str = "Image processing failed";
pub const EXPORT_FAILED: &str = "Export failed";

/// Sink for user-visible messages; raw engine errors never reach it.
pub trait Notifier {
    fn notify(&self, body: &str);
}

/// Posts messages as desktop notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, body: &str) {
        send(body);
    }
}

pub fn send(body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname("pixtune")
        .summary("pixtune")
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}
