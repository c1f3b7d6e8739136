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

//! # `stratis-cli`
//!
//! Command line client for `stratisd`, the Stratis storage daemon. It turns
//! user commands into D-Bus calls and formats the replies:
//!
//!  * Resolve pool and filesystem names into D-Bus object paths by searching
//!    the daemon's object graph.
//!
//!  * Create, destroy, snapshot, or rename filesystems.
//!
//!  * List filesystems of one pool or of every pool.
//!
//! Every operation runs against a [`Client`][1], which wraps a
//! [`TransPort`][2]. [`Client::connect()`][3] uses the system bus; tests and
//! other callers can supply their own transport.
//!
//! # Example code
//!
//! ```rust,no_run
//! extern crate stratis_cli;
//! use stratis_cli::{filesystems, Client, FilesystemInfo};
//!
//! fn main() {
//!     let mut c = Client::connect().unwrap();
//!     c.verify_stratisd_version().unwrap();
//!     let mo = c.managed_objects().unwrap();
//!     for (path, props) in filesystems().search(&mo).unwrap() {
//!         let fs = FilesystemInfo::from_properties(path, props).unwrap();
//!         println!("Got filesystem: {} {}", fs.name, fs.devnode);
//!     }
//! }
//! ```
//!
//! [1]: struct.Client.html
//! [2]: trait.TransPort.html
//! [3]: struct.Client.html#method.connect

extern crate chrono;
extern crate clap;
extern crate dbus;
#[macro_use]
extern crate log;
extern crate regex;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

pub use self::client::Client;
pub use self::data::*;
pub use self::error::{engine_error_name, MatchFailure, Result, StratisError};
pub use self::ipc::{DbusTransPort, MethodArg, MethodReply, TransPort,
                    SERVICE, TOP_OBJECT};
pub use self::misc::{check_version, parse_version, print_table, Alignment,
                     MAXIMUM_STRATISD_VERSION, REQUIRED_STRATISD_VERSION};
pub use self::util::get_objects;

pub mod cli;
pub mod logical;

mod client;
mod data;
mod error;
mod ipc;
mod misc;
mod util;
