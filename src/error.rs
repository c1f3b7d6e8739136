// Copyright (C) 2018 Red Hat, Inc.
//
// Permission is hereby granted, free of charge, to any
// person obtaining a copy of this software and associated
// documentation files (the "Software"), to deal in the
// Software without restriction, including without
// limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software
// is furnished to do so, subject to the following
// conditions:
//
// The above copyright notice and this permission notice
// shall be included in all copies or substantial portions
// of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF
// ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED
// TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A
// PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT
// SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY
// CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR
// IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
// DEALINGS IN THE SOFTWARE.

use std::fmt;
use std::result;

/// Why a name based lookup failed to resolve to exactly one object.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchFailure {
    /// No object carried the requested properties.
    NotFound,
    /// More than one object carried the requested properties.
    Ambiguous(usize),
}

#[derive(Debug)]
pub enum StratisError {
    /// The daemon replied with a non-OK return code.
    EngineError { code: u16, message: String },
    /// A lookup that required exactly one match got zero or several.
    NoUniqueMatch {
        interface: String,
        kind: MatchFailure,
    },
    /// The running daemon is outside the supported version range.
    VersionMismatch {
        actual: Vec<u32>,
        min: Vec<u32>,
        max: Vec<u32>,
    },
    DaemonNotRunning(String),
    DbusError(String),
    DaemonBug(String),
    InvalidArgument(String),
    Io(String),
}

impl ::std::error::Error for StratisError {}

fn version_string(v: &[u32]) -> String {
    v.iter()
        .map(|i| i.to_string())
        .collect::<Vec<String>>()
        .join(".")
}

impl fmt::Display for StratisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StratisError::EngineError { code, ref message } => write!(
                f,
                "stratisd failed to perform the operation that you \
                 requested. It returned the following error code: {} ({}) \
                 and message: {}",
                code,
                engine_error_name(code),
                message
            ),
            StratisError::NoUniqueMatch {
                ref interface,
                ref kind,
            } => match *kind {
                MatchFailure::NotFound => {
                    write!(f, "No object of interface {} matched", interface)
                }
                MatchFailure::Ambiguous(count) => write!(
                    f,
                    "Expected a unique object of interface {} but found {}",
                    interface, count
                ),
            },
            StratisError::VersionMismatch {
                ref actual,
                ref min,
                ref max,
            } => write!(
                f,
                "stratisd version {} does not meet the requirements of \
                 this CLI: minimum {}, maximum {}",
                version_string(actual),
                version_string(min),
                version_string(max)
            ),
            StratisError::DaemonNotRunning(ref x)
            | StratisError::DbusError(ref x)
            | StratisError::DaemonBug(ref x)
            | StratisError::InvalidArgument(ref x)
            | StratisError::Io(ref x) => write!(f, "{}", x),
        }
    }
}

pub type Result<T> = result::Result<T, StratisError>;

impl From<::dbus::Error> for StratisError {
    fn from(e: ::dbus::Error) -> Self {
        match e.name() {
            Some("org.freedesktop.DBus.Error.ServiceUnknown")
            | Some("org.freedesktop.DBus.Error.NameHasNoOwner") => {
                StratisError::DaemonNotRunning(format!(
                    "stratisd is not running: {}",
                    e.message().unwrap_or("")
                ))
            }
            _ => StratisError::DbusError(format!(
                "D-Bus error {}: {}",
                e.name().unwrap_or("unknown"),
                e.message().unwrap_or("")
            )),
        }
    }
}

impl From<::dbus::arg::TypeMismatchError> for StratisError {
    fn from(e: ::dbus::arg::TypeMismatchError) -> Self {
        StratisError::DaemonBug(format!(
            "Unexpected argument type in stratisd reply: {}",
            e
        ))
    }
}

impl From<::serde_json::Error> for StratisError {
    fn from(e: ::serde_json::Error) -> Self {
        StratisError::DaemonBug(format!(
            "Failed to convert stratisd properties to struct: {}",
            e
        ))
    }
}

impl From<::std::num::ParseIntError> for StratisError {
    fn from(e: ::std::num::ParseIntError) -> Self {
        StratisError::DaemonBug(format!("Failed to parse integer: {}", e))
    }
}

impl From<::std::io::Error> for StratisError {
    fn from(e: ::std::io::Error) -> Self {
        StratisError::Io(format!("{}", e))
    }
}

impl From<::chrono::ParseError> for StratisError {
    fn from(e: ::chrono::ParseError) -> Self {
        StratisError::DaemonBug(format!("Invalid timestamp: {}", e))
    }
}

impl From<::regex::Error> for StratisError {
    fn from(e: ::regex::Error) -> Self {
        StratisError::DaemonBug(format!("Regex error: {}", e))
    }
}

pub const STRATISD_ERROR_OK: u16 = 0;
const STRATISD_ERROR_ERROR: u16 = 1;
const STRATISD_ERROR_ALREADY_EXISTS: u16 = 2;
const STRATISD_ERROR_BUSY: u16 = 3;
const STRATISD_ERROR_INTERNAL_ERROR: u16 = 4;
const STRATISD_ERROR_NOTFOUND: u16 = 5;

/// Symbolic name of a stratisd return code.
pub fn engine_error_name(code: u16) -> &'static str {
    match code {
        STRATISD_ERROR_OK => "OK",
        STRATISD_ERROR_ERROR => "ERROR",
        STRATISD_ERROR_ALREADY_EXISTS => "ALREADY_EXISTS",
        STRATISD_ERROR_BUSY => "BUSY",
        STRATISD_ERROR_INTERNAL_ERROR => "INTERNAL_ERROR",
        STRATISD_ERROR_NOTFOUND => "NOTFOUND",
        _ => "unknown",
    }
}
