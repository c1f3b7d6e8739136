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

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde_json::{self, Map, Value};

use super::error::*;

pub const MANAGER_INTERFACE: &str = "org.storage.stratis1.Manager";
pub const POOL_INTERFACE: &str = "org.storage.stratis1.pool";
pub const FILESYSTEM_INTERFACE: &str = "org.storage.stratis1.filesystem";

const CREATED_FORMAT: &str = "%b %d %Y %H:%M";

/// Property name to property value for one interface of one object.
pub type PropertyMap = Map<String, Value>;

/// Interface name to the properties the object exposes on it.
pub type Interfaces = BTreeMap<String, PropertyMap>;

/// Property name to required value.
pub type Predicate = Map<String, Value>;

/// Snapshot of the object graph returned by `GetManagedObjects`.
///
/// Entries keep the order in which they were inserted, so searches report
/// matches in snapshot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedObjects {
    objects: Vec<(String, Interfaces)>,
}

impl ManagedObjects {
    pub fn new() -> ManagedObjects {
        ManagedObjects::default()
    }

    /// Build a snapshot from entries whose object paths are already
    /// distinct, keeping their order.
    pub fn from_unique(
        objects: Vec<(String, Interfaces)>,
    ) -> ManagedObjects {
        ManagedObjects { objects }
    }

    /// Insert an object. Re-inserting a path replaces its interfaces in
    /// place.
    pub fn insert(&mut self, object_path: String, interfaces: Interfaces) {
        match self.objects.iter_mut().find(|o| o.0 == object_path) {
            Some(o) => o.1 = interfaces,
            None => self.objects.push((object_path, interfaces)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Interfaces)> {
        self.objects.iter().map(|o| (o.0.as_str(), &o.1))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Search for objects carrying an interface whose properties match a
/// predicate.
///
/// ```rust
/// use stratis_cli::{pools, ManagedObjects};
///
/// let mo = ManagedObjects::new();
/// let found = pools().prop("Name", "pool1").search(&mo).unwrap();
/// assert!(found.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ObjectSearch {
    interface: &'static str,
    props: Predicate,
    unique: bool,
}

impl ObjectSearch {
    pub fn new(interface: &'static str) -> ObjectSearch {
        ObjectSearch {
            interface,
            props: Predicate::new(),
            unique: false,
        }
    }

    /// Require property `name` to equal `value`.
    pub fn prop<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    /// Require every entry of `props`. Entries already set with the same
    /// name are overridden.
    pub fn props(mut self, props: Predicate) -> Self {
        for (k, v) in props {
            self.props.insert(k, v);
        }
        self
    }

    /// When set, [`search()`](#method.search) fails unless exactly one
    /// object matches.
    pub fn require_unique_match(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// Filter `objects`, keeping snapshot order.
    ///
    /// # Errors
    ///
    ///  * [`StratisError::NoUniqueMatch`][1] when uniqueness is required
    ///    and the number of matches is not one.
    ///
    /// [1]: enum.StratisError.html#variant.NoUniqueMatch
    pub fn search<'a>(
        &self,
        objects: &'a ManagedObjects,
    ) -> Result<Vec<(&'a str, &'a PropertyMap)>> {
        let found: Vec<(&'a str, &'a PropertyMap)> = objects
            .iter()
            .filter_map(|(path, ifaces)| {
                ifaces.get(self.interface).map(|props| (path, props))
            })
            .filter(|&(_, props)| {
                self.props.iter().all(|(k, v)| props.get(k) == Some(v))
            })
            .collect();

        if self.unique && found.len() != 1 {
            return Err(StratisError::NoUniqueMatch {
                interface: self.interface.to_string(),
                kind: if found.is_empty() {
                    MatchFailure::NotFound
                } else {
                    MatchFailure::Ambiguous(found.len())
                },
            });
        }
        Ok(found)
    }

    /// Search requiring exactly one match and return it.
    pub fn unique<'a>(
        &self,
        objects: &'a ManagedObjects,
    ) -> Result<(&'a str, &'a PropertyMap)> {
        let mut found =
            self.clone().require_unique_match(true).search(objects)?;
        match found.pop() {
            Some(f) => Ok(f),
            None => Err(StratisError::NoUniqueMatch {
                interface: self.interface.to_string(),
                kind: MatchFailure::NotFound,
            }),
        }
    }
}

/// Search pools.
pub fn pools() -> ObjectSearch {
    ObjectSearch::new(POOL_INTERFACE)
}

/// Search filesystems.
pub fn filesystems() -> ObjectSearch {
    ObjectSearch::new(FILESYSTEM_INTERFACE)
}

fn from_properties<T>(props: &PropertyMap) -> Result<T>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_value(Value::Object(props.clone()))?)
}

/// A named storage aggregate managed by stratisd.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PoolInfo {
    /// D-Bus object path.
    #[serde(skip)]
    pub path: String,
    /// Human friendly name.
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Uuid", default)]
    pub uuid: String,
}

impl PoolInfo {
    pub fn from_properties(
        path: &str,
        props: &PropertyMap,
    ) -> Result<PoolInfo> {
        let mut p: PoolInfo = from_properties(props)?;
        p.path = path.to_string();
        Ok(p)
    }
}

/// A filesystem living in a pool.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct FilesystemInfo {
    /// D-Bus object path.
    #[serde(skip)]
    pub path: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// Object path of the owner pool.
    #[serde(rename = "Pool")]
    pub pool: String,
    /// Creation time, RFC 3339.
    #[serde(rename = "Created")]
    pub created: String,
    /// Device node, e.g. `/stratis/pool1/fs1`.
    #[serde(rename = "Devnode")]
    pub devnode: String,
    #[serde(rename = "Uuid")]
    pub uuid: String,
}

impl FilesystemInfo {
    pub fn from_properties(
        path: &str,
        props: &PropertyMap,
    ) -> Result<FilesystemInfo> {
        let mut f: FilesystemInfo = from_properties(props)?;
        f.path = path.to_string();
        Ok(f)
    }

    /// Creation time converted to local time, e.g. `Aug 01 2018 14:47`.
    pub fn created_local(&self) -> Result<String> {
        let t = DateTime::parse_from_rfc3339(&self.created)?;
        Ok(t.with_timezone(&Local).format(CREATED_FORMAT).to_string())
    }
}
