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

use serde_json::Value;

use super::data::*;
use super::error::*;
use super::ipc::{DbusTransPort, MethodArg, MethodReply, TransPort, TOP_OBJECT};
use super::misc::check_version;

trait OkOrDaemonBug<T> {
    fn ok_or_daemon_bug(self, val: &Value) -> Result<T>;
}

impl<T> OkOrDaemonBug<T> for Option<T> {
    fn ok_or_daemon_bug(self, val: &Value) -> Result<T> {
        match self {
            Some(i) => Ok(i),
            None => Err(StratisError::DaemonBug(format!(
                "stratisd returned unexpected data: {}",
                val
            ))),
        }
    }
}

/// Most stratisd methods return `(changed, value)`. Older ones return the
/// bare value, which is treated as changed.
fn split_changed(v: &Value) -> (bool, &Value) {
    if let Some(a) = v.as_array() {
        if a.len() == 2 {
            if let Some(b) = a[0].as_bool() {
                return (b, &a[1]);
            }
        }
    }
    (true, v)
}

fn check_reply(reply: MethodReply) -> Result<Value> {
    if reply.return_code != STRATISD_ERROR_OK {
        return Err(StratisError::EngineError {
            code: reply.return_code,
            message: reply.message,
        });
    }
    Ok(reply.result)
}

/// Represent the connection to stratisd.
pub struct Client<T: TransPort> {
    tp: T,
}

impl Client<DbusTransPort> {
    /// Connect to stratisd on the system bus. The per call timeout is taken
    /// from `STRATIS_DBUS_TIMEOUT`.
    ///
    /// # Errors
    ///
    ///  * [`StratisError::DaemonNotRunning`][1]
    ///  * [`StratisError::InvalidArgument`][2] on an invalid timeout.
    ///
    /// [1]: enum.StratisError.html#variant.DaemonNotRunning
    /// [2]: enum.StratisError.html#variant.InvalidArgument
    pub fn connect() -> Result<Client<DbusTransPort>> {
        Ok(Client::new(DbusTransPort::new()?))
    }
}

impl<T: TransPort> Client<T> {
    pub fn new(tp: T) -> Client<T> {
        Client { tp }
    }

    /// The transport this client talks through.
    pub fn transport(&self) -> &T {
        &self.tp
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.tp
    }

    /// Version string reported by the running stratisd.
    pub fn stratisd_version(&mut self) -> Result<String> {
        let val = self.tp.property(TOP_OBJECT, MANAGER_INTERFACE, "Version")?;
        Ok(val.as_str().ok_or_daemon_bug(&val)?.to_string())
    }

    /// Fail unless the running stratisd is within the supported version
    /// range. Call before any version sensitive operation.
    ///
    /// # Errors
    ///
    ///  * [`StratisError::VersionMismatch`][1]
    ///
    /// [1]: enum.StratisError.html#variant.VersionMismatch
    pub fn verify_stratisd_version(&mut self) -> Result<()> {
        let version = self.stratisd_version()?;
        check_version(&version)?;
        info!("stratisd version {} is supported", version);
        Ok(())
    }

    /// Fetch a fresh snapshot of the object graph.
    pub fn managed_objects(&mut self) -> Result<ManagedObjects> {
        self.tp.managed_objects()
    }

    /// Create filesystems named `names` in the pool at `pool_path`.
    /// Returns the object path and name of every filesystem created.
    pub fn create_filesystems(
        &mut self,
        pool_path: &str,
        names: &[String],
    ) -> Result<Vec<(String, String)>> {
        let reply = self.tp.invoke(
            pool_path,
            POOL_INTERFACE,
            "CreateFilesystems",
            &[MethodArg::StrArray(names.to_vec())],
        )?;
        let val = check_reply(reply)?;
        let (_, created) = split_changed(&val);
        let mut ret = Vec::new();
        for entry in created.as_array().ok_or_daemon_bug(&val)? {
            let pair = entry.as_array().ok_or_daemon_bug(&val)?;
            let path = pair.get(0).and_then(Value::as_str);
            let name = pair.get(1).and_then(Value::as_str);
            match (path, name) {
                (Some(p), Some(n)) => ret.push((p.to_string(), n.to_string())),
                _ => {
                    return Err(StratisError::DaemonBug(format!(
                        "stratisd returned unexpected data: {}",
                        val
                    )))
                }
            }
        }
        Ok(ret)
    }

    /// Destroy the filesystems at `fs_paths` in the pool at `pool_path`.
    /// Returns the UUIDs stratisd reports as destroyed.
    pub fn destroy_filesystems(
        &mut self,
        pool_path: &str,
        fs_paths: &[String],
    ) -> Result<Vec<String>> {
        let reply = self.tp.invoke(
            pool_path,
            POOL_INTERFACE,
            "DestroyFilesystems",
            &[MethodArg::ObjectPathArray(fs_paths.to_vec())],
        )?;
        let val = check_reply(reply)?;
        let (_, destroyed) = split_changed(&val);
        let mut ret = Vec::new();
        for uuid in destroyed.as_array().ok_or_daemon_bug(&val)? {
            ret.push(uuid.as_str().ok_or_daemon_bug(&val)?.to_string());
        }
        Ok(ret)
    }

    /// Snapshot the filesystem at `origin_path` under the name
    /// `snapshot_name`. Returns the object path of the snapshot.
    pub fn snapshot_filesystem(
        &mut self,
        pool_path: &str,
        origin_path: &str,
        snapshot_name: &str,
    ) -> Result<String> {
        let reply = self.tp.invoke(
            pool_path,
            POOL_INTERFACE,
            "SnapshotFilesystem",
            &[
                MethodArg::ObjectPath(origin_path.to_string()),
                MethodArg::Str(snapshot_name.to_string()),
            ],
        )?;
        let val = check_reply(reply)?;
        let (_, path) = split_changed(&val);
        Ok(path.as_str().ok_or_daemon_bug(&val)?.to_string())
    }

    /// Rename the filesystem at `fs_path`. Returns whether the name
    /// changed.
    pub fn set_filesystem_name(
        &mut self,
        fs_path: &str,
        name: &str,
    ) -> Result<bool> {
        let reply = self.tp.invoke(
            fs_path,
            FILESYSTEM_INTERFACE,
            "SetName",
            &[MethodArg::Str(name.to_string())],
        )?;
        let val = check_reply(reply)?;
        Ok(split_changed(&val).0)
    }
}
