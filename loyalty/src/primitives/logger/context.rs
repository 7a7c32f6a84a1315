use std::cell::RefCell;

thread_local! {
    static LOG_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// A scope guard that prefixes log lines with `[Loyalty][<scope>]` until dropped.
///
/// Scopes nest: dropping an inner guard restores the outer prefix.
///
/// # Examples
///
/// ```rust
/// use loyalty::primitives::logger::{get_context, LogContext};
///
/// {
///     let _ctx = LogContext::new("HistoryUseCase");
///     assert_eq!(get_context().as_deref(), Some("[Loyalty][HistoryUseCase]"));
/// }
/// assert_eq!(get_context(), None);
/// ```
pub struct LogContext {
    previous: Option<String>,
}

impl LogContext {
    /// Opens a logging scope named `scope`.
    #[must_use]
    pub fn new(scope: &str) -> Self {
        let previous = LOG_CONTEXT.with(|ctx| {
            ctx.borrow_mut()
                .replace(format!("[Loyalty][{scope}]"))
        });

        Self { previous }
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        LOG_CONTEXT.with(|ctx| {
            (*ctx.borrow_mut()).clone_from(&self.previous);
        });
    }
}

/// Gets the current logging prefix, if any.
#[must_use]
pub fn get_context() -> Option<String> {
    LOG_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Runs a block inside a named logging scope.
///
/// ```rust
/// use loyalty::with_log_context;
///
/// let value = with_log_context!("AuthProvider" => {
///     loyalty::primitives::logger::get_context()
/// });
/// assert_eq!(value.as_deref(), Some("[Loyalty][AuthProvider]"));
/// ```
#[macro_export]
macro_rules! with_log_context {
    ($scope:expr => $block:block) => {{
        let _loyalty_logger_ctx = $crate::primitives::logger::LogContext::new($scope);
        $block
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_contexts_restore_outer_scope() {
        let outer = LogContext::new("Outer");
        {
            let _inner = LogContext::new("Inner");
            assert_eq!(get_context().as_deref(), Some("[Loyalty][Inner]"));
        }
        assert_eq!(get_context().as_deref(), Some("[Loyalty][Outer]"));
        drop(outer);
        assert_eq!(get_context(), None);
    }
}
