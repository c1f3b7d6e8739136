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

//! Actions on the logical aspects of a pool: its filesystems.

use std::io::Write;

use clap::Args;

use super::client::Client;
use super::data::*;
use super::error::*;
use super::ipc::TransPort;
use super::misc::{print_table, Alignment};
use super::util::get_objects;

/// Create filesystems in a pool.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Pool name.
    pub pool_name: String,
    /// Name of new filesystem.
    #[arg(required = true)]
    pub fs_name: Vec<String>,
}

/// List filesystems.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Pool name; all pools when omitted.
    pub pool_name: Option<String>,
}

/// Destroy filesystems in a pool.
#[derive(Args, Debug, Clone)]
pub struct DestroyArgs {
    /// Pool name.
    pub pool_name: String,
    /// Filesystem names to destroy.
    #[arg(required = true)]
    pub fs_name: Vec<String>,
}

/// Snapshot a filesystem.
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Pool name.
    pub pool_name: String,
    /// Name of the filesystem to snapshot.
    pub origin_name: String,
    /// Name of the snapshot.
    pub snapshot_name: String,
}

/// Rename a filesystem.
#[derive(Args, Debug, Clone)]
pub struct RenameArgs {
    /// Pool name.
    pub pool_name: String,
    /// Current filesystem name.
    pub fs_name: String,
    /// New filesystem name.
    pub new_name: String,
}

/// Create volumes in a pool.
///
/// # Errors
///
///  * [`StratisError::NoUniqueMatch`][1] unknown or ambiguous pool.
///  * [`StratisError::EngineError`][2]
///
/// [1]: enum.StratisError.html#variant.NoUniqueMatch
/// [2]: enum.StratisError.html#variant.EngineError
pub fn create_volumes<T: TransPort>(
    client: &mut Client<T>,
    args: &CreateArgs,
) -> Result<()> {
    let mo = client.managed_objects()?;
    let (pool_path, _) =
        pools().prop("Name", args.pool_name.as_str()).unique(&mo)?;

    let created = client.create_filesystems(pool_path, &args.fs_name)?;
    for (path, name) in created {
        debug!("Created filesystem {} at {}", name, path);
    }
    Ok(())
}

/// List the volumes in one pool, or in every pool.
pub fn list_volumes<T: TransPort, W: Write>(
    client: &mut Client<T>,
    args: &ListArgs,
    out: &mut W,
) -> Result<()> {
    let mo = client.managed_objects()?;
    let (fss, path_to_name) = get_objects(
        args.pool_name.as_deref(),
        &mo,
        filesystems,
        FilesystemInfo::from_properties,
    )?;

    let mut rows = Vec::with_capacity(fss.len());
    for fs in &fss {
        let pool_name = match path_to_name.get(&fs.pool) {
            Some(n) => n.clone(),
            None => {
                return Err(StratisError::DaemonBug(format!(
                    "Filesystem {} belongs to unknown pool {}",
                    fs.name, fs.pool
                )))
            }
        };
        rows.push(vec![
            pool_name,
            fs.name.clone(),
            fs.created_local()?,
            fs.devnode.clone(),
            fs.uuid.clone(),
        ]);
    }
    rows.sort_by(|a, b| a[0].cmp(&b[0]));

    print_table(
        out,
        &["Pool Name", "Name", "Created", "Device", "UUID"],
        &rows,
        &[Alignment::Left; 5],
    )
}

/// Destroy volumes in a pool.
///
/// Names that do not resolve to a filesystem of the pool are skipped; the
/// daemon is called with whatever did resolve.
pub fn destroy_volumes<T: TransPort>(
    client: &mut Client<T>,
    args: &DestroyArgs,
) -> Result<()> {
    let mo = client.managed_objects()?;
    let (pool_path, _) =
        pools().prop("Name", args.pool_name.as_str()).unique(&mo)?;

    let mut fs_paths = Vec::new();
    for name in &args.fs_name {
        let found = filesystems()
            .prop("Name", name.as_str())
            .prop("Pool", pool_path)
            .search(&mo)?;
        if found.is_empty() {
            warn!("No filesystem {} in pool {}", name, args.pool_name);
        }
        fs_paths.extend(found.into_iter().map(|(p, _)| p.to_string()));
    }

    let destroyed = client.destroy_filesystems(pool_path, &fs_paths)?;
    debug!("Destroyed filesystems {:?}", destroyed);
    Ok(())
}

/// Snapshot a filesystem in a pool.
pub fn snapshot_filesystem<T: TransPort>(
    client: &mut Client<T>,
    args: &SnapshotArgs,
) -> Result<()> {
    let mo = client.managed_objects()?;
    let (pool_path, _) =
        pools().prop("Name", args.pool_name.as_str()).unique(&mo)?;
    let (origin_path, _) = filesystems()
        .prop("Name", args.origin_name.as_str())
        .prop("Pool", pool_path)
        .unique(&mo)?;

    let snapshot_path = client.snapshot_filesystem(
        pool_path,
        origin_path,
        &args.snapshot_name,
    )?;
    debug!("Snapshot {} created at {}", args.snapshot_name, snapshot_path);
    Ok(())
}

/// Rename a filesystem.
pub fn rename_fs<T: TransPort>(
    client: &mut Client<T>,
    args: &RenameArgs,
) -> Result<()> {
    let mo = client.managed_objects()?;
    let (pool_path, _) =
        pools().prop("Name", args.pool_name.as_str()).unique(&mo)?;
    let (fs_path, _) = filesystems()
        .prop("Name", args.fs_name.as_str())
        .prop("Pool", pool_path)
        .unique(&mo)?;

    if !client.set_filesystem_name(fs_path, &args.new_name)? {
        info!("Filesystem {} already named {}", fs_path, args.new_name);
    }
    Ok(())
}
