//! The notification sink trait and the logging fallback sink.

use async_trait::async_trait;

/// Delivers a text message to a phone number.
///
/// Dispatch is best-effort and non-cancelable once issued: implementations
/// return `true` on confirmed hand-off and `false` otherwise, log their own
/// failures, and must never panic. Callers do not retry.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, phone: &str, message: &str) -> bool;
}

/// Sink that writes messages to the log stream instead of a carrier.
///
/// The default when no SMS credentials are configured — development and
/// test deployments see every would-be message at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(&self, phone: &str, message: &str) -> bool {
        tracing::info!(%phone, %message, "notification (log sink)");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sink_always_reports_success() {
        assert!(LogSink.send("+911234567890", "hello").await);
    }
}
