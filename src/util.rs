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

use super::data::*;
use super::error::*;

/// Get the objects found by `search_function`, optionally scoped to the
/// pool named `pool_name`.
///
/// Returns the objects built by `constructor` together with a map from pool
/// object path to pool name. With a pool name the map holds only that pool,
/// otherwise it holds every pool in `managed_objects`.
///
/// # Errors
///
///  * [`StratisError::NoUniqueMatch`][1] if `pool_name` does not name
///    exactly one pool.
///
/// [1]: enum.StratisError.html#variant.NoUniqueMatch
pub fn get_objects<T, F>(
    pool_name: Option<&str>,
    managed_objects: &ManagedObjects,
    search_function: fn() -> ObjectSearch,
    constructor: F,
) -> Result<(Vec<T>, BTreeMap<String, String>)>
where
    F: Fn(&str, &PropertyMap) -> Result<T>,
{
    let mut path_to_name = BTreeMap::new();
    let search = match pool_name {
        Some(name) => {
            let (pool_path, _) =
                pools().prop("Name", name).unique(managed_objects)?;
            debug!("Pool {} resolved to {}", name, pool_path);
            path_to_name.insert(pool_path.to_string(), name.to_string());
            search_function().prop("Pool", pool_path)
        }
        None => {
            for (path, props) in pools().search(managed_objects)? {
                let pool = PoolInfo::from_properties(path, props)?;
                path_to_name.insert(pool.path, pool.name);
            }
            search_function()
        }
    };

    let mut objects = Vec::new();
    for (path, props) in search.search(managed_objects)? {
        objects.push(constructor(path, props)?);
    }
    Ok((objects, path_to_name))
}
