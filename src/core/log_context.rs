//! Nested logging contexts
//!
//! This module provides:
//! - a thread-local stack of context frames, each naming a logger
//! - `LogContext`: RAII guard pushing a frame for the lifetime of a scope
//! - `push_context`/`pop_context`: the same stack driven explicitly
//!
//! Entering component `db` while the current context is `app` makes `app.db`
//! the default logger name of the thread. A frame may carry its own level;
//! the innermost frame with an explicit level decides the threshold, falling
//! back to the registry's effective level of the composed name.
//!
//! # Example
//!
//! ```
//! use rust_hierarchical_logger::{default_logger_name, LogContext, LogLevel};
//!
//! assert_eq!(default_logger_name(), "");
//! {
//!     let _outer = LogContext::new("component").unwrap();
//!     let inner = LogContext::with_level("subcomp", LogLevel::Trace).unwrap();
//!     assert_eq!(inner.name(), "component.subcomp");
//!     assert_eq!(default_logger_name(), "component.subcomp");
//! }
//! assert_eq!(default_logger_name(), "");
//! ```

use super::error::{LoggerError, Result};
use super::hierarchy::Hierarchy;
use super::log_level::LogLevel;
use std::cell::RefCell;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
struct Frame {
    name: String,
    level: Option<LogLevel>,
}

thread_local! {
    static STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Check that `component` can name a single context level.
pub fn validate_component(component: &str) -> Result<()> {
    if component.is_empty() || component.contains('.') {
        return Err(LoggerError::InvalidContextName(component.to_string()));
    }
    Ok(())
}

/// Child logger name of `parent` for `component`.
pub fn compose_name(parent: &str, component: &str) -> String {
    if parent.is_empty() {
        component.to_string()
    } else {
        format!("{}.{}", parent, component)
    }
}

/// Enter `component` below the current context.
pub fn push_context(component: &str) -> Result<()> {
    push_frame(component, None).map(|_| ())
}

/// Enter `component` with an explicit level override.
pub fn push_context_with_level(component: &str, level: LogLevel) -> Result<()> {
    push_frame(component, Some(level)).map(|_| ())
}

fn push_frame(component: &str, level: Option<LogLevel>) -> Result<(usize, String)> {
    validate_component(component)?;
    STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        let parent = stack.last().map_or("", |f| f.name.as_str());
        let name = compose_name(parent, component);
        stack.push(Frame {
            name: name.clone(),
            level,
        });
        Ok((stack.len(), name))
    })
}

/// Leave the innermost context, returning its name.
///
/// # Panics
///
/// Panics when no context is active. An unmatched exit means the
/// enter/exit discipline of the calling code is broken.
pub fn pop_context() -> String {
    let popped = STACK.with(|stack| stack.borrow_mut().pop());
    match popped {
        Some(frame) => frame.name,
        None => panic!("{}", LoggerError::ContextUnderflow),
    }
}

/// Logger name of the innermost context, `""` (root) outside any context.
pub fn default_logger_name() -> String {
    STACK.with(|stack| stack.borrow().last().map(|f| f.name.clone()).unwrap_or_default())
}

/// Number of active contexts on this thread.
pub fn depth() -> usize {
    STACK.with(|stack| stack.borrow().len())
}

/// Innermost explicit level among the first `depth` frames.
fn explicit_level(frames: &[Frame]) -> Option<LogLevel> {
    frames.iter().rev().find_map(|f| f.level)
}

/// Threshold of the current context.
pub fn effective_level_in(hierarchy: &Hierarchy) -> LogLevel {
    STACK.with(|stack| {
        let stack = stack.borrow();
        let name = stack.last().map_or("", |f| f.name.as_str());
        explicit_level(&stack).unwrap_or_else(|| hierarchy.effective_level(name))
    })
}

/// Current logger name if a record at `level` passes the current threshold.
pub(crate) fn enabled_name_in(hierarchy: &Hierarchy, level: LogLevel) -> Option<String> {
    STACK.with(|stack| {
        let stack = stack.borrow();
        let name = stack.last().map_or("", |f| f.name.as_str());
        let threshold = explicit_level(&stack).unwrap_or_else(|| hierarchy.effective_level(name));
        level.passes(threshold).then(|| name.to_string())
    })
}

/// RAII guard for a logging context
///
/// Created by [`LogContext::new`] or [`LogContext::with_level`]; the frame is
/// popped when the guard is dropped, including during unwinding. Guards must
/// be dropped in reverse order of creation and stay on their thread.
#[must_use = "the context is left as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LogContext {
    depth: usize,
    name: String,
    _not_send: PhantomData<*const ()>,
}

impl LogContext {
    pub fn new(component: &str) -> Result<Self> {
        Self::enter(component, None)
    }

    pub fn with_level(component: &str, level: LogLevel) -> Result<Self> {
        Self::enter(component, Some(level))
    }

    fn enter(component: &str, level: Option<LogLevel>) -> Result<Self> {
        let (depth, name) = push_frame(component, level)?;
        Ok(Self {
            depth,
            name,
            _not_send: PhantomData,
        })
    }

    /// Full dotted name of this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Explicit level of this frame, if any.
    pub fn level(&self) -> Option<LogLevel> {
        self.with_frame(|frame| frame.level)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.with_frame(|frame| frame.level = Some(level));
    }

    /// Remove this frame's override so the level is inherited again.
    pub fn clear_level(&self) {
        self.with_frame(|frame| frame.level = None);
    }

    /// Threshold applying to records emitted in this context.
    pub fn effective_level(&self) -> LogLevel {
        self.effective_level_in(Hierarchy::global())
    }

    pub fn effective_level_in(&self, hierarchy: &Hierarchy) -> LogLevel {
        let explicit = STACK.with(|stack| {
            let stack = stack.borrow();
            explicit_level(&stack[..self.depth.min(stack.len())])
        });
        explicit.unwrap_or_else(|| hierarchy.effective_level(&self.name))
    }

    pub fn is_enabled_for(&self, level: LogLevel) -> bool {
        level.passes(self.effective_level())
    }

    /// # Panics
    ///
    /// Panics when the guard's frame was already popped with [`pop_context`].
    fn with_frame<R>(&self, f: impl FnOnce(&mut Frame) -> R) -> R {
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frame = self
                .depth
                .checked_sub(1)
                .and_then(|index| stack.get_mut(index))
                .filter(|frame| frame.name == self.name);
            match frame {
                Some(frame) => f(frame),
                None => {
                    let current = stack.len();
                    drop(stack);
                    self.out_of_order(current)
                }
            }
        })
    }

    fn out_of_order(&self, current: usize) -> ! {
        panic!(
            "logging context '{}' used out of order (depth {}, stack depth {})",
            self.name, self.depth, current
        )
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.len() == self.depth {
                stack.pop();
            } else if std::thread::panicking() {
                stack.truncate(self.depth.saturating_sub(1));
            } else {
                let current = stack.len();
                drop(stack);
                self.out_of_order(current);
            }
        });
    }
}
