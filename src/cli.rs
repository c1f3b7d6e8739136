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

//! Command line surface of `stratis`.

use std::io::Write;

use clap::{Parser, Subcommand};

use super::client::Client;
use super::error::*;
use super::ipc::TransPort;
use super::logical::{self, CreateArgs, DestroyArgs, ListArgs, RenameArgs,
                     SnapshotArgs};

/// Stratis storage manager.
#[derive(Parser, Debug)]
#[command(name = "stratis", version, about = "Stratis Storage Manager")]
pub struct Cli {
    /// Let errors propagate instead of printing a short message.
    #[arg(long, global = true)]
    pub propagate: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Perform general filesystem actions.
    #[command(alias = "fs")]
    Filesystem {
        #[command(subcommand)]
        action: Option<FilesystemCommand>,
    },
    /// Stratis daemon information.
    Daemon {
        #[command(subcommand)]
        action: DaemonCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum FilesystemCommand {
    /// Create filesystems in a pool.
    Create(CreateArgs),
    /// List filesystems.
    List(ListArgs),
    /// Destroy filesystems in a pool.
    Destroy(DestroyArgs),
    /// Snapshot the named filesystem in a pool.
    Snapshot(SnapshotArgs),
    /// Rename a filesystem.
    Rename(RenameArgs),
}

#[derive(Subcommand, Debug)]
pub enum DaemonCommand {
    /// Version of the running stratisd.
    Version,
}

/// Run `command` against stratisd through `client`, writing any listing to
/// `out`.
///
/// Filesystem commands check the daemon version first and do nothing else
/// if it is not supported.
pub fn run<T: TransPort, W: Write>(
    client: &mut Client<T>,
    command: Commands,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Filesystem { action } => {
            client.verify_stratisd_version()?;
            match action
                .unwrap_or_else(|| FilesystemCommand::List(ListArgs::default()))
            {
                FilesystemCommand::Create(args) => {
                    logical::create_volumes(client, &args)
                }
                FilesystemCommand::List(args) => {
                    logical::list_volumes(client, &args, out)
                }
                FilesystemCommand::Destroy(args) => {
                    logical::destroy_volumes(client, &args)
                }
                FilesystemCommand::Snapshot(args) => {
                    logical::snapshot_filesystem(client, &args)
                }
                FilesystemCommand::Rename(args) => {
                    logical::rename_fs(client, &args)
                }
            }
        }
        Commands::Daemon {
            action: DaemonCommand::Version,
        } => {
            writeln!(out, "{}", client.stratisd_version()?)?;
            Ok(())
        }
    }
}
