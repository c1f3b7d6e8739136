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

use std::env;
use std::time::Duration;

use dbus::arg::{ArgType, RefArg, Variant};
use dbus::blocking::stdintf::org_freedesktop_dbus::{ObjectManager, Properties};
use dbus::blocking::{BlockingSender, Connection};
use dbus::{Message, Path};
use serde_json::{Map, Number, Value};

use super::data::{Interfaces, ManagedObjects, PropertyMap};
use super::error::*;

pub const SERVICE: &str = "org.storage.stratis1";
pub const TOP_OBJECT: &str = "/org/storage/stratis1";

static TIMEOUT_VAR_NAME: &str = "STRATIS_DBUS_TIMEOUT";
const TIMEOUT_DEFAULT_MS: u64 = 120_000;
// Value libdbus uses when the caller asks for its default timeout.
const TIMEOUT_DBUS_DEFAULT_MS: u64 = 25_000;

/// Argument of a daemon method call.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodArg {
    Str(String),
    StrArray(Vec<String>),
    ObjectPath(String),
    ObjectPathArray(Vec<String>),
}

/// Reply of a stratisd method: every method returns a result followed by a
/// return code and a message.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodReply {
    pub result: Value,
    pub return_code: u16,
    pub message: String,
}

/// Capability to talk to stratisd: fetch the object graph, read a property,
/// call a method.
pub trait TransPort {
    fn managed_objects(&mut self) -> Result<ManagedObjects>;

    fn property(
        &mut self,
        object_path: &str,
        interface: &str,
        name: &str,
    ) -> Result<Value>;

    fn invoke(
        &mut self,
        object_path: &str,
        interface: &str,
        method: &str,
        args: &[MethodArg],
    ) -> Result<MethodReply>;
}

/// Blocking connection to stratisd on the system bus.
pub struct DbusTransPort {
    conn: Connection,
    timeout: Duration,
}

impl DbusTransPort {
    pub fn new() -> Result<DbusTransPort> {
        let timeout = dbus_timeout()?;
        let conn = match Connection::new_system() {
            Ok(c) => c,
            Err(e) => {
                return Err(StratisError::DaemonNotRunning(format!(
                    "Failed to connect to the D-Bus system bus: {}",
                    e.message().unwrap_or("")
                )))
            }
        };
        Ok(DbusTransPort { conn, timeout })
    }
}

impl TransPort for DbusTransPort {
    fn managed_objects(&mut self) -> Result<ManagedObjects> {
        debug!("GetManagedObjects on {}", TOP_OBJECT);
        let proxy = self.conn.with_proxy(SERVICE, TOP_OBJECT, self.timeout);
        let objects = proxy.get_managed_objects()?;

        let mut paths: Vec<(String, _)> = objects
            .into_iter()
            .map(|(path, interfaces)| (path.to_string(), interfaces))
            .collect();
        paths.sort_by(|a, b| a.0.cmp(&b.0));

        let mut ret = Vec::with_capacity(paths.len());
        for (path, interfaces) in paths {
            let mut ifaces = Interfaces::new();
            for (iface, props) in interfaces {
                let mut prop_map = PropertyMap::new();
                for (name, variant) in props {
                    prop_map.insert(name, refarg_to_value(&*variant.0));
                }
                ifaces.insert(iface, prop_map);
            }
            ret.push((path, ifaces));
        }
        Ok(ManagedObjects::from_unique(ret))
    }

    fn property(
        &mut self,
        object_path: &str,
        interface: &str,
        name: &str,
    ) -> Result<Value> {
        debug!("Get {}.{} on {}", interface, name, object_path);
        let proxy = self.conn.with_proxy(SERVICE, object_path, self.timeout);
        let v: Variant<Box<dyn RefArg + 'static>> =
            proxy.get(interface, name)?;
        Ok(refarg_to_value(&*v.0))
    }

    fn invoke(
        &mut self,
        object_path: &str,
        interface: &str,
        method: &str,
        args: &[MethodArg],
    ) -> Result<MethodReply> {
        debug!(
            "Calling {}.{} on {} with {:?}",
            interface, method, object_path, args
        );
        let mut msg =
            Message::new_method_call(SERVICE, object_path, interface, method)
                .map_err(StratisError::InvalidArgument)?;
        for arg in args {
            msg = append_arg(msg, arg)?;
        }

        let reply = self.conn.send_with_reply_and_block(msg, self.timeout)?;

        let mut iter = reply.iter_init();
        let result = match iter.get_refarg() {
            Some(r) => refarg_to_value(&*r),
            None => {
                return Err(StratisError::DaemonBug(format!(
                    "Got empty reply from {}.{}",
                    interface, method
                )))
            }
        };
        iter.next();
        let return_code: u16 = iter.read()?;
        let message: String = iter.read()?;

        Ok(MethodReply {
            result,
            return_code,
            message,
        })
    }
}

fn object_path(s: &str) -> Result<Path<'static>> {
    Path::new(s.to_string()).map_err(|e| {
        StratisError::InvalidArgument(format!(
            "Invalid D-Bus object path '{}': {}",
            s, e
        ))
    })
}

fn append_arg(msg: Message, arg: &MethodArg) -> Result<Message> {
    Ok(match *arg {
        MethodArg::Str(ref s) => msg.append1(s.as_str()),
        MethodArg::StrArray(ref v) => msg.append1(v.clone()),
        MethodArg::ObjectPath(ref p) => msg.append1(object_path(p)?),
        MethodArg::ObjectPathArray(ref v) => {
            let mut paths = Vec::with_capacity(v.len());
            for p in v {
                paths.push(object_path(p)?);
            }
            msg.append1(paths)
        }
    })
}

/// Convert a D-Bus value into its JSON equivalent. Object paths and
/// signatures become strings, dictionaries become objects.
pub(crate) fn refarg_to_value(a: &dyn RefArg) -> Value {
    match a.arg_type() {
        ArgType::String | ArgType::ObjectPath | ArgType::Signature => a
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null),
        ArgType::Boolean => {
            Value::Bool(a.as_u64().map(|b| b != 0).unwrap_or(false))
        }
        ArgType::Byte
        | ArgType::UInt16
        | ArgType::UInt32
        | ArgType::UInt64 => {
            a.as_u64().map(Value::from).unwrap_or(Value::Null)
        }
        ArgType::Int16 | ArgType::Int32 | ArgType::Int64 => {
            a.as_i64().map(Value::from).unwrap_or(Value::Null)
        }
        ArgType::Double => a
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ArgType::Variant => match a.as_iter().and_then(|mut i| i.next()) {
            Some(inner) => refarg_to_value(inner),
            None => Value::Null,
        },
        ArgType::Array if a.signature().starts_with("a{") => {
            let mut map = Map::new();
            if let Some(mut iter) = a.as_iter() {
                while let (Some(k), Some(v)) = (iter.next(), iter.next()) {
                    let key = match refarg_to_value(k) {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    map.insert(key, refarg_to_value(v));
                }
            }
            Value::Object(map)
        }
        ArgType::Array | ArgType::Struct => match a.as_iter() {
            Some(iter) => Value::Array(iter.map(refarg_to_value).collect()),
            None => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Per call D-Bus timeout, read from `STRATIS_DBUS_TIMEOUT` in milliseconds.
/// `-1` selects the D-Bus library default.
pub fn dbus_timeout() -> Result<Duration> {
    match env::var(TIMEOUT_VAR_NAME) {
        Ok(v) => parse_timeout(&v),
        Err(_) => Ok(Duration::from_millis(TIMEOUT_DEFAULT_MS)),
    }
}

pub(crate) fn parse_timeout(v: &str) -> Result<Duration> {
    let invalid = || {
        StratisError::InvalidArgument(format!(
            "The timeout value provided by {} ('{}') must be an integer \
             number of milliseconds greater than or equal to -1",
            TIMEOUT_VAR_NAME, v
        ))
    };
    let ms = v.trim().parse::<i64>().map_err(|_| invalid())?;
    match ms {
        -1 => Ok(Duration::from_millis(TIMEOUT_DBUS_DEFAULT_MS)),
        ms if ms >= 0 => Ok(Duration::from_millis(ms as u64)),
        _ => Err(invalid()),
    }
}
