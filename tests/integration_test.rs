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

extern crate chrono;
extern crate rand;
extern crate serde_json;
extern crate stratis_cli;

use chrono::{DateTime, Local};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};

use stratis_cli::cli::{run, Commands, DaemonCommand, FilesystemCommand};
use stratis_cli::logical::{self, CreateArgs, DestroyArgs, ListArgs,
                           RenameArgs, SnapshotArgs};
use stratis_cli::{filesystems, get_objects, pools, Client, FilesystemInfo,
                  Interfaces, ManagedObjects, MatchFailure, MethodArg,
                  MethodReply, PropertyMap, StratisError, TransPort,
                  FILESYSTEM_INTERFACE, MANAGER_INTERFACE, POOL_INTERFACE,
                  TOP_OBJECT};

static CREATED: &str = "2018-08-01T14:47:47+00:00";
static POOL_1: &str = "/org/storage/stratis1/1";
static POOL_2: &str = "/org/storage/stratis1/2";

#[derive(Debug, Clone, PartialEq)]
struct Call {
    object_path: String,
    interface: String,
    method: String,
    args: Vec<MethodArg>,
}

/// In memory stand in for stratisd.
struct FakeStratisd {
    objects: ManagedObjects,
    version: String,
    return_code: u16,
    result: Value,
    calls: Vec<Call>,
    snapshots_taken: usize,
}

impl FakeStratisd {
    fn new(objects: ManagedObjects) -> FakeStratisd {
        FakeStratisd {
            objects,
            version: "1.0.0".to_string(),
            return_code: 0,
            result: json!([true, []]),
            calls: Vec::new(),
            snapshots_taken: 0,
        }
    }
}

impl TransPort for FakeStratisd {
    fn managed_objects(&mut self) -> stratis_cli::Result<ManagedObjects> {
        self.snapshots_taken += 1;
        Ok(self.objects.clone())
    }

    fn property(
        &mut self,
        object_path: &str,
        interface: &str,
        name: &str,
    ) -> stratis_cli::Result<Value> {
        assert_eq!(object_path, TOP_OBJECT);
        assert_eq!(interface, MANAGER_INTERFACE);
        assert_eq!(name, "Version");
        Ok(Value::String(self.version.clone()))
    }

    fn invoke(
        &mut self,
        object_path: &str,
        interface: &str,
        method: &str,
        args: &[MethodArg],
    ) -> stratis_cli::Result<MethodReply> {
        self.calls.push(Call {
            object_path: object_path.to_string(),
            interface: interface.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
        });
        Ok(MethodReply {
            result: self.result.clone(),
            return_code: self.return_code,
            message: if self.return_code == 0 {
                "Ok".to_string()
            } else {
                "something went wrong".to_string()
            },
        })
    }
}

fn random_string(prefix: &str) -> String {
    let rand_str: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, rand_str)
}

fn props(v: Value) -> PropertyMap {
    match v {
        Value::Object(m) => m,
        _ => panic!("not an object: {}", v),
    }
}

fn add_pool(mo: &mut ManagedObjects, path: &str, name: &str) {
    let mut ifaces = Interfaces::new();
    ifaces.insert(
        POOL_INTERFACE.to_string(),
        props(json!({"Name": name, "Uuid": random_string("uuid-")})),
    );
    mo.insert(path.to_string(), ifaces);
}

fn add_fs(mo: &mut ManagedObjects, path: &str, pool: &str, name: &str) {
    let mut ifaces = Interfaces::new();
    ifaces.insert(
        FILESYSTEM_INTERFACE.to_string(),
        props(json!({
            "Name": name,
            "Pool": pool,
            "Created": CREATED,
            "Devnode": format!("/stratis/{}", name),
            "Uuid": format!("uuid-{}", name),
        })),
    );
    mo.insert(path.to_string(), ifaces);
}

/// Two pools, `zpool` listed before `apool`, with three filesystems.
fn sample_objects() -> ManagedObjects {
    let mut mo = ManagedObjects::new();
    let mut top = Interfaces::new();
    top.insert(
        MANAGER_INTERFACE.to_string(),
        props(json!({"Version": "1.0.0"})),
    );
    mo.insert(TOP_OBJECT.to_string(), top);
    add_pool(&mut mo, POOL_1, "zpool");
    add_pool(&mut mo, POOL_2, "apool");
    add_fs(&mut mo, "/org/storage/stratis1/3", POOL_1, "zfs1");
    add_fs(&mut mo, "/org/storage/stratis1/4", POOL_2, "afs2");
    add_fs(&mut mo, "/org/storage/stratis1/5", POOL_2, "afs1");
    mo
}

fn make_client(mo: ManagedObjects) -> Client<FakeStratisd> {
    Client::new(FakeStratisd::new(mo))
}

fn calls(c: &Client<FakeStratisd>) -> &[Call] {
    &c.transport().calls
}

fn list_output(
    c: &mut Client<FakeStratisd>,
    pool_name: Option<&str>,
) -> String {
    let mut out = Vec::new();
    logical::list_volumes(
        c,
        &ListArgs {
            pool_name: pool_name.map(|s| s.to_string()),
        },
        &mut out,
    )
    .unwrap();
    String::from_utf8(out).unwrap()
}

fn local_created() -> String {
    DateTime::parse_from_rfc3339(CREATED)
        .unwrap()
        .with_timezone(&Local)
        .format("%b %d %Y %H:%M")
        .to_string()
}

#[test]
fn search_unique_pool() {
    let mo = sample_objects();
    let (path, props) = pools().prop("Name", "apool").unique(&mo).unwrap();
    assert_eq!(path, "/org/storage/stratis1/2");
    assert_eq!(props["Name"], json!("apool"));

    let found = pools()
        .prop("Name", "zpool")
        .require_unique_match(true)
        .search(&mo)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, "/org/storage/stratis1/1");
}

#[test]
fn search_empty_predicate_keeps_snapshot_order() {
    let mo = sample_objects();
    let found: Vec<&str> = filesystems()
        .search(&mo)
        .unwrap()
        .into_iter()
        .map(|(p, _)| p)
        .collect();
    assert_eq!(
        found,
        vec![
            "/org/storage/stratis1/3",
            "/org/storage/stratis1/4",
            "/org/storage/stratis1/5"
        ]
    );
    // Objects without the interface never match.
    assert_eq!(pools().search(&mo).unwrap().len(), 2);
}

#[test]
fn search_not_found_and_ambiguous() {
    let mut mo = sample_objects();
    match pools().prop("Name", "nopool").unique(&mo) {
        Err(StratisError::NoUniqueMatch { kind, interface }) => {
            assert_eq!(kind, MatchFailure::NotFound);
            assert_eq!(interface, POOL_INTERFACE);
        }
        other => panic!("expected no unique match, got {:?}", other),
    }
    // Without uniqueness a miss is just an empty result.
    assert!(pools().prop("Name", "nopool").search(&mo).unwrap().is_empty());

    add_pool(&mut mo, "/org/storage/stratis1/9", "apool");
    match pools()
        .prop("Name", "apool")
        .require_unique_match(true)
        .search(&mo)
    {
        Err(StratisError::NoUniqueMatch { kind, .. }) => {
            assert_eq!(kind, MatchFailure::Ambiguous(2))
        }
        other => panic!("expected no unique match, got {:?}", other),
    }
}

#[test]
fn search_scoped_to_pool() {
    let mo = sample_objects();
    let found = filesystems()
        .prop("Pool", "/org/storage/stratis1/2")
        .search(&mo)
        .unwrap();
    assert_eq!(found.len(), 2);
    let found = filesystems()
        .prop("Name", "zfs1")
        .prop("Pool", "/org/storage/stratis1/2")
        .search(&mo)
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn get_objects_all_pools() {
    let mo = sample_objects();
    let (fss, path_to_name) =
        get_objects(None, &mo, filesystems, FilesystemInfo::from_properties)
            .unwrap();
    assert_eq!(fss.len(), 3);
    assert_eq!(path_to_name.len(), 2);
    assert_eq!(path_to_name["/org/storage/stratis1/1"], "zpool");
    assert_eq!(path_to_name["/org/storage/stratis1/2"], "apool");
}

#[test]
fn get_objects_one_pool() {
    let mo = sample_objects();
    let (fss, path_to_name) = get_objects(
        Some("apool"),
        &mo,
        filesystems,
        FilesystemInfo::from_properties,
    )
    .unwrap();
    let names: Vec<&str> = fss.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["afs2", "afs1"]);
    assert_eq!(path_to_name.len(), 1);
    assert_eq!(path_to_name["/org/storage/stratis1/2"], "apool");
    assert!(get_objects(
        Some("nopool"),
        &mo,
        filesystems,
        FilesystemInfo::from_properties
    )
    .is_err());
}

#[test]
fn list_all_pools_sorted() {
    let mut c = make_client(sample_objects());
    let out = list_output(&mut c, None);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Pool Name  Name  Created"));
    assert!(lines[0].ends_with("UUID"));
    // Sorted by pool name, ties keep snapshot order.
    assert!(lines[1].starts_with("apool      afs2"));
    assert!(lines[2].starts_with("apool      afs1"));
    assert!(lines[3].starts_with("zpool      zfs1"));
    assert!(lines[3].contains(&local_created()));
    assert!(lines[3].contains("/stratis/zfs1"));
    assert!(lines[3].ends_with("uuid-zfs1"));
    assert!(calls(&c).is_empty());
}

#[test]
fn list_one_pool() {
    let mut c = make_client(sample_objects());
    let out = list_output(&mut c, Some("zpool"));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("zpool      zfs1"));

    let mut out = Vec::<u8>::new();
    match logical::list_volumes(
        &mut c,
        &ListArgs {
            pool_name: Some("nopool".to_string()),
        },
        &mut out,
    ) {
        Err(StratisError::NoUniqueMatch { .. }) => (),
        other => panic!("expected no unique match, got {:?}", other),
    }
}

#[test]
fn list_empty_prints_header() {
    let mut mo = ManagedObjects::new();
    add_pool(&mut mo, "/org/storage/stratis1/1", "p");
    let mut c = make_client(mo);
    let out = list_output(&mut c, None);
    assert_eq!(out, "Pool Name  Name  Created  Device  UUID\n");
}

#[test]
fn create() {
    let mut c = make_client(sample_objects());
    c.transport_mut().result =
        json!([true, [["/org/storage/stratis1/7", "new1"]]]);
    logical::create_volumes(
        &mut c,
        &CreateArgs {
            pool_name: "apool".to_string(),
            fs_name: vec!["new1".to_string()],
        },
    )
    .unwrap();
    assert_eq!(
        calls(&c),
        &[Call {
            object_path: "/org/storage/stratis1/2".to_string(),
            interface: POOL_INTERFACE.to_string(),
            method: "CreateFilesystems".to_string(),
            args: vec![MethodArg::StrArray(vec!["new1".to_string()])],
        }]
    );
}

#[test]
fn create_in_unknown_pool_makes_no_call() {
    let mut c = make_client(sample_objects());
    let ret = logical::create_volumes(
        &mut c,
        &CreateArgs {
            pool_name: random_string("pool_"),
            fs_name: vec!["new1".to_string()],
        },
    );
    match ret {
        Err(StratisError::NoUniqueMatch { kind, .. }) => {
            assert_eq!(kind, MatchFailure::NotFound)
        }
        other => panic!("expected no unique match, got {:?}", other),
    }
    assert!(calls(&c).is_empty());
}

#[test]
fn destroy() {
    let mut c = make_client(sample_objects());
    logical::destroy_volumes(
        &mut c,
        &DestroyArgs {
            pool_name: "apool".to_string(),
            fs_name: vec!["afs1".to_string(), "afs2".to_string()],
        },
    )
    .unwrap();
    assert_eq!(calls(&c).len(), 1);
    assert_eq!(calls(&c)[0].method, "DestroyFilesystems");
    assert_eq!(
        calls(&c)[0].args,
        vec![MethodArg::ObjectPathArray(vec![
            "/org/storage/stratis1/5".to_string(),
            "/org/storage/stratis1/4".to_string(),
        ])]
    );
}

// Unknown names, and names living in another pool, are dropped silently and
// the daemon is still called.
#[test]
fn destroy_skips_unresolved_names() {
    let mut c = make_client(sample_objects());
    logical::destroy_volumes(
        &mut c,
        &DestroyArgs {
            pool_name: "apool".to_string(),
            fs_name: vec!["zfs1".to_string(), random_string("fs_")],
        },
    )
    .unwrap();
    assert_eq!(calls(&c).len(), 1);
    assert_eq!(calls(&c)[0].args, vec![MethodArg::ObjectPathArray(vec![])]);
}

#[test]
fn snapshot() {
    let mut c = make_client(sample_objects());
    c.transport_mut().result = json!([true, "/org/storage/stratis1/8"]);
    logical::snapshot_filesystem(
        &mut c,
        &SnapshotArgs {
            pool_name: "zpool".to_string(),
            origin_name: "zfs1".to_string(),
            snapshot_name: "snap".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        calls(&c),
        &[Call {
            object_path: "/org/storage/stratis1/1".to_string(),
            interface: POOL_INTERFACE.to_string(),
            method: "SnapshotFilesystem".to_string(),
            args: vec![
                MethodArg::ObjectPath("/org/storage/stratis1/3".to_string()),
                MethodArg::Str("snap".to_string()),
            ],
        }]
    );
}

#[test]
fn snapshot_origin_in_other_pool() {
    let mut c = make_client(sample_objects());
    let ret = logical::snapshot_filesystem(
        &mut c,
        &SnapshotArgs {
            pool_name: "apool".to_string(),
            origin_name: "zfs1".to_string(),
            snapshot_name: "snap".to_string(),
        },
    );
    match ret {
        Err(StratisError::NoUniqueMatch { interface, .. }) => {
            assert_eq!(interface, FILESYSTEM_INTERFACE)
        }
        other => panic!("expected no unique match, got {:?}", other),
    }
    assert!(calls(&c).is_empty());
}

#[test]
fn rename() {
    let mut c = make_client(sample_objects());
    c.transport_mut().result = json!([true, "uuid-afs2"]);
    logical::rename_fs(
        &mut c,
        &RenameArgs {
            pool_name: "apool".to_string(),
            fs_name: "afs2".to_string(),
            new_name: "renamed".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        calls(&c),
        &[Call {
            object_path: "/org/storage/stratis1/4".to_string(),
            interface: FILESYSTEM_INTERFACE.to_string(),
            method: "SetName".to_string(),
            args: vec![MethodArg::Str("renamed".to_string())],
        }]
    );
}

#[test]
fn engine_error_is_reported() {
    let mut c = make_client(sample_objects());
    c.transport_mut().return_code = 2;
    let ret = logical::create_volumes(
        &mut c,
        &CreateArgs {
            pool_name: "zpool".to_string(),
            fs_name: vec!["zfs1".to_string()],
        },
    );
    match ret {
        Err(StratisError::EngineError { code, message }) => {
            assert_eq!(code, 2);
            assert_eq!(message, "something went wrong");
        }
        other => panic!("expected engine error, got {:?}", other),
    }

    let ret = logical::rename_fs(
        &mut c,
        &RenameArgs {
            pool_name: "zpool".to_string(),
            fs_name: "zfs1".to_string(),
            new_name: "x".to_string(),
        },
    );
    match ret {
        Err(e @ StratisError::EngineError { .. }) => {
            assert!(e.to_string().contains("ALREADY_EXISTS"))
        }
        other => panic!("expected engine error, got {:?}", other),
    }
}

#[test]
fn destroy_engine_error() {
    let mut c = make_client(sample_objects());
    c.transport_mut().return_code = 5;
    let ret = logical::destroy_volumes(
        &mut c,
        &DestroyArgs {
            pool_name: "apool".to_string(),
            fs_name: vec!["afs1".to_string()],
        },
    );
    match ret {
        Err(StratisError::EngineError { code, message }) => {
            assert_eq!(code, 5);
            assert_eq!(message, "something went wrong");
        }
        other => panic!("expected engine error, got {:?}", other),
    }
    assert_eq!(calls(&c).len(), 1);
    assert_eq!(calls(&c)[0].method, "DestroyFilesystems");
}

#[test]
fn snapshot_engine_error() {
    let mut c = make_client(sample_objects());
    c.transport_mut().return_code = 3;
    let ret = logical::snapshot_filesystem(
        &mut c,
        &SnapshotArgs {
            pool_name: "zpool".to_string(),
            origin_name: "zfs1".to_string(),
            snapshot_name: "snap".to_string(),
        },
    );
    match ret {
        Err(StratisError::EngineError { code, message }) => {
            assert_eq!(code, 3);
            assert_eq!(message, "something went wrong");
        }
        other => panic!("expected engine error, got {:?}", other),
    }
    assert_eq!(calls(&c).len(), 1);
    assert_eq!(calls(&c)[0].method, "SnapshotFilesystem");
}

#[test]
fn destroy_malformed_reply() {
    let mut c = make_client(sample_objects());
    c.transport_mut().result = json!([true, "not a list"]);
    let ret = logical::destroy_volumes(
        &mut c,
        &DestroyArgs {
            pool_name: "apool".to_string(),
            fs_name: vec!["afs1".to_string()],
        },
    );
    match ret {
        Err(StratisError::DaemonBug(_)) => (),
        other => panic!("expected daemon bug, got {:?}", other),
    }

    c.transport_mut().result = json!([true, ["uuid-afs1", 7]]);
    let ret = c.destroy_filesystems(
        POOL_2,
        &["/org/storage/stratis1/5".to_string()],
    );
    match ret {
        Err(StratisError::DaemonBug(_)) => (),
        other => panic!("expected daemon bug, got {:?}", other),
    }

    c.transport_mut().result = json!([true, ["uuid-afs1"]]);
    let destroyed = c
        .destroy_filesystems(POOL_2, &["/org/storage/stratis1/5".to_string()])
        .unwrap();
    assert_eq!(destroyed, vec!["uuid-afs1".to_string()]);
}

#[test]
fn list_filesystem_in_unknown_pool() {
    let mut mo = sample_objects();
    add_fs(
        &mut mo,
        "/org/storage/stratis1/6",
        "/org/storage/stratis1/99",
        "orphan",
    );
    let mut c = make_client(mo);
    let mut out = Vec::<u8>::new();
    match logical::list_volumes(&mut c, &ListArgs::default(), &mut out) {
        Err(StratisError::DaemonBug(msg)) => {
            assert!(msg.contains("orphan"));
            assert!(msg.contains("/org/storage/stratis1/99"));
        }
        other => panic!("expected daemon bug, got {:?}", other),
    }
    assert!(out.is_empty());
}

#[test]
fn managed_objects_from_unique_keeps_order() {
    let mo = ManagedObjects::from_unique(vec![
        ("/b".to_string(), Interfaces::new()),
        ("/a".to_string(), Interfaces::new()),
    ]);
    let paths: Vec<&str> = mo.iter().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/b", "/a"]);

    let mut mo = mo;
    let mut ifaces = Interfaces::new();
    ifaces.insert(POOL_INTERFACE.to_string(), props(json!({"Name": "p"})));
    mo.insert("/b".to_string(), ifaces);
    assert_eq!(mo.len(), 2);
    assert_eq!(pools().unique(&mo).unwrap().0, "/b");
}

#[test]
fn version_boundaries_through_run() {
    for (version, ok) in &[
        ("1.0.0", true),
        ("2.0.0", true),
        ("0.9.9", false),
        ("2.0.1", false),
    ] {
        let mut c = make_client(sample_objects());
        c.transport_mut().version = version.to_string();
        let ret = run(
            &mut c,
            Commands::Filesystem {
                action: Some(FilesystemCommand::Destroy(DestroyArgs {
                    pool_name: "apool".to_string(),
                    fs_name: vec!["afs1".to_string()],
                })),
            },
            &mut Vec::<u8>::new(),
        );
        if *ok {
            assert!(ret.is_ok(), "{} should be accepted", version);
            assert_eq!(calls(&c).len(), 1);
        } else {
            match ret {
                Err(StratisError::VersionMismatch { min, max, .. }) => {
                    assert_eq!(min, vec![1, 0, 0]);
                    assert_eq!(max, vec![2, 0, 0]);
                }
                other => panic!("expected version mismatch, got {:?}", other),
            }
            // Nothing was looked up or called.
            assert!(calls(&c).is_empty());
            assert_eq!(c.transport().snapshots_taken, 0);
        }
    }
}

#[test]
fn filesystem_without_action_lists() {
    let mut c = make_client(sample_objects());
    let mut out = Vec::new();
    run(&mut c, Commands::Filesystem { action: None }, &mut out).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 4);
}

#[test]
fn daemon_version() {
    let mut c = make_client(ManagedObjects::new());
    c.transport_mut().version = "1.0.3".to_string();
    let mut out = Vec::new();
    run(
        &mut c,
        Commands::Daemon {
            action: DaemonCommand::Version,
        },
        &mut out,
    )
    .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "1.0.3\n");
}
