//! Mapped Diagnostic Context
//!
//! This module provides:
//! - `FieldValue`: value type for MDC entries and printf arguments
//! - thread-local `put`/`remove`/`get`/`snapshot` operations
//! - `MdcGuard`: RAII guard for scoped MDC entries
//!
//! Entries are kept per thread in insertion order. Values are converted to
//! text when a record is emitted, not when they are inserted. The MDC is
//! independent of logging contexts: leaving a `LogContext` neither restores
//! nor clears MDC entries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

thread_local! {
    static MDC: RefCell<IndexMap<String, FieldValue>> = RefCell::new(IndexMap::new());
}

/// Value type for MDC entries and formatting arguments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Char(c) => write!(f, "{}", c),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

impl FieldValue {
    /// Capture any displayable value by its `Display` text.
    pub fn display(value: &dyn fmt::Display) -> Self {
        FieldValue::String(value.to_string())
    }

    /// Textual representation of a type, for values that only carry identity.
    ///
    /// ```
    /// use rust_hierarchical_logger::FieldValue;
    ///
    /// struct Session;
    /// let value = FieldValue::type_of::<Session>();
    /// assert!(value.to_string().starts_with("<type '"));
    /// assert!(value.to_string().ends_with("Session'>"));
    /// ```
    pub fn type_of<T: ?Sized>() -> Self {
        FieldValue::String(format!("<type '{}'>", std::any::type_name::<T>()))
    }

    /// Integer view used by numeric conversions.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::UInt(u) => Some(*u as i64),
            FieldValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            FieldValue::Bool(b) => Some(i64::from(*b)),
            FieldValue::Char(c) => Some(u32::from(*c) as i64),
            FieldValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating point view used by numeric conversions.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::UInt(u) => Some(*u as f64),
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(i: $t) -> Self {
                FieldValue::Int(i as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(u: $t) -> Self {
                FieldValue::UInt(u as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<char> for FieldValue {
    fn from(c: char) -> Self {
        FieldValue::Char(c)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// Insert or overwrite `key` in the calling thread's MDC.
///
/// Overwriting keeps the key's original position.
pub fn put<K, V>(key: K, value: V)
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    MDC.with(|mdc| {
        mdc.borrow_mut().insert(key.into(), value.into());
    });
}

/// Remove `key` from the calling thread's MDC, returning its value.
pub fn remove(key: &str) -> Option<FieldValue> {
    MDC.with(|mdc| mdc.borrow_mut().shift_remove(key))
}

pub fn get(key: &str) -> Option<FieldValue> {
    MDC.with(|mdc| mdc.borrow().get(key).cloned())
}

pub fn clear() {
    MDC.with(|mdc| mdc.borrow_mut().clear());
}

pub fn len() -> usize {
    MDC.with(|mdc| mdc.borrow().len())
}

pub fn is_empty() -> bool {
    len() == 0
}

/// Current entries of the calling thread, stringified, in insertion order.
pub fn snapshot() -> Vec<(String, String)> {
    MDC.with(|mdc| {
        mdc.borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    })
}

/// Insert `key` for the lifetime of the returned guard.
///
/// On drop the previous value of `key` is restored, or the key is removed
/// if it was absent.
///
/// # Example
///
/// ```
/// use rust_hierarchical_logger::mdc;
///
/// {
///     let _guard = mdc::put_scoped("request_id", "abc-123");
///     assert_eq!(mdc::get("request_id").map(|v| v.to_string()), Some("abc-123".into()));
/// }
/// assert!(mdc::get("request_id").is_none());
/// ```
pub fn put_scoped<K, V>(key: K, value: V) -> MdcGuard
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    let key = key.into();
    let previous = MDC.with(|mdc| mdc.borrow_mut().insert(key.clone(), value.into()));
    MdcGuard {
        key,
        previous,
        _not_send: PhantomData,
    }
}

/// RAII guard for a scoped MDC entry
///
/// Bound to the thread that created it.
pub struct MdcGuard {
    key: String,
    previous: Option<FieldValue>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for MdcGuard {
    fn drop(&mut self) {
        // thread-local may already be gone during thread teardown
        let _ = MDC.try_with(|mdc| {
            let mut mdc = mdc.borrow_mut();
            match self.previous.take() {
                Some(value) => {
                    mdc.insert(self.key.clone(), value);
                }
                None => {
                    mdc.shift_remove(&self.key);
                }
            }
        });
    }
}
