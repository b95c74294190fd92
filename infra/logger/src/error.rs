/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("invalid logger configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to prepare log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build file appender: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("a global subscriber is already installed: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
