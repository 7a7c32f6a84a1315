use std::sync::{Arc, OnceLock};

/// Receives every log line emitted by the SDK.
///
/// Native apps implement this once and register it with [`set_logger`] so SDK logs end up in
/// the app's own logging pipeline (Logcat, `os_log`, crash reporters).
///
/// # Examples
///
/// ```rust
/// use loyalty::primitives::logger::{LogLevel, Logger};
///
/// struct StdoutLogger;
///
/// impl Logger for StdoutLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         println!("[{level:?}] {message}");
///     }
/// }
/// ```
///
/// ## Kotlin
///
/// ```kotlin
/// object LoyaltyLogBridge : Logger {
///     override fun log(level: LogLevel, message: String) {
///         when (level) {
///             LogLevel.ERROR -> Log.e("Loyalty", message)
///             LogLevel.WARN -> Log.w("Loyalty", message)
///             LogLevel.INFO -> Log.i("Loyalty", message)
///             else -> Log.d("Loyalty", message)
///         }
///     }
/// }
///
/// // Application.onCreate
/// setLogger(LoyaltyLogBridge)
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Logs `message` at `level`.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a log line, most verbose first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, uniffi::Enum)]
pub enum LogLevel {
    /// Very detailed tracing, including response sizes.
    Trace,
    /// Request lines and decoding steps.
    Debug,
    /// Session changes and configuration.
    Info,
    /// Recoverable problems, such as server errors.
    Warn,
    /// Failures the caller will see.
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

/// Bridge between the `log` facade and the registered foreign [`Logger`].
struct ForeignLogger;

impl ForeignLogger {
    /// Debug and trace lines of dependencies are noise for app developers.
    fn forwards(record: &log::Record) -> bool {
        record.level() <= log::Level::Info
            || record
                .module_path()
                .is_some_and(|path| path.starts_with("loyalty"))
    }
}

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) || !Self::forwards(record) {
            return;
        }
        match LOGGER_INSTANCE.get() {
            Some(logger) => logger.log(record.level().into(), record.args().to_string()),
            None => eprintln!("loyalty: {}", record.args()),
        }
    }

    fn flush(&self) {}
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

/// Registers the foreign logger. Only the first call has any effect.
///
/// Logging starts at [`LogLevel::Debug`]; use [`set_log_level`] to change it.
#[allow(clippy::module_name_repetitions)]
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        eprintln!("loyalty: logger already registered");
        return;
    }

    if let Err(e) = init_logger() {
        eprintln!("loyalty: cannot install the log bridge: {e}");
    }
}

/// Sets the most verbose level that is forwarded to the foreign logger.
#[uniffi::export]
pub fn set_log_level(level: LogLevel) {
    log::set_max_level(level.into());
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    static LOGGER: ForeignLogger = ForeignLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_in_context {
    ($level:ident, $($arg:tt)*) => {
        match $crate::primitives::logger::get_context() {
            Some(scope) => log::log!(log::Level::$level, "{} {}", scope, format_args!($($arg)*)),
            None => log::log!(log::Level::$level, $($arg)*),
        }
    };
}

/// `log::trace!` prefixed with the current [`LogContext`].
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => { $crate::__log_in_context!(Trace, $($arg)*) };
}

/// `log::debug!` prefixed with the current [`LogContext`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => { $crate::__log_in_context!(Debug, $($arg)*) };
}

/// `log::info!` prefixed with the current [`LogContext`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::__log_in_context!(Info, $($arg)*) };
}

/// `log::warn!` prefixed with the current [`LogContext`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::__log_in_context!(Warn, $($arg)*) };
}

/// `log::error!` prefixed with the current [`LogContext`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::__log_in_context!(Error, $($arg)*) };
}

/// Scoped logging prefixes.
pub mod context;
pub use context::{get_context, LogContext};
