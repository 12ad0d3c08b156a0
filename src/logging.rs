use std::fmt;

/// Request-scoped logger.
///
/// Every event carries the `request_id` field so trust decisions and
/// rewrites can be correlated with the rest of the request's logs.
#[derive(Debug, Clone, Copy)]
pub struct OriginLog<'a> {
    request_id: &'a str,
}

impl<'a> OriginLog<'a> {
    /// Creates a logger for one request.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Logs an info-level message with request ID.
    ///
    /// Use with `format_args!` for efficient formatting:
    /// ```no_run
    /// # use origin_gate::OriginLog;
    /// let log = OriginLog::new("req-1");
    /// log.info(format_args!("trusted forwarded origin {}", "https://public.example.com"));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a warning-level message with request ID.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    /// Logs a debug-level message with request ID.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}
