//! Typed values for HiGHS solver options
use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};

/// A value that can be assigned to a HiGHS option.
///
/// For the list of available options and their types, see:
/// <https://ergo-code.github.io/HiGHS/dev/options/definitions/>
pub trait HighsOptionValue {
    /// Apply this value to the named option of the given HiGHS instance
    ///
    /// # Safety
    /// `highs` must point to a live HiGHS instance and `option` to a nul-terminated string.
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int;
}

impl HighsOptionValue for bool {
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int {
        highs_sys::Highs_setBoolOptionValue(highs, option, if *self { 1 } else { 0 })
    }
}

impl HighsOptionValue for i32 {
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int {
        highs_sys::Highs_setIntOptionValue(highs, option, *self)
    }
}

impl HighsOptionValue for f64 {
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int {
        highs_sys::Highs_setDoubleOptionValue(highs, option, *self)
    }
}

impl HighsOptionValue for &str {
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int {
        match CString::new(*self) {
            Ok(value) => highs_sys::Highs_setStringOptionValue(highs, option, value.as_ptr()),
            Err(_) => highs_sys::STATUS_ERROR,
        }
    }
}

/// An owned option value, kept by [`HighsSolver`](super::HighsSolver) and
/// applied to every model it builds.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// `bool` options such as `presolve_on`
    Bool(bool),
    /// `int` options such as `threads`
    Int(i32),
    /// `double` options such as `time_limit` or `mip_rel_gap`
    Float(f64),
    /// `string` options such as `presolve` or `solver`
    Text(String),
}

impl HighsOptionValue for OptionValue {
    unsafe fn apply_to_highs(&self, highs: *mut c_void, option: *const c_char) -> c_int {
        match self {
            OptionValue::Bool(v) => v.apply_to_highs(highs, option),
            OptionValue::Int(v) => v.apply_to_highs(highs, option),
            OptionValue::Float(v) => v.apply_to_highs(highs, option),
            OptionValue::Text(v) => v.as_str().apply_to_highs(highs, option),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}
