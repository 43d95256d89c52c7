use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use libflexvol::{
    DriverCall, DriverConfig, DriverStatus, FlexError, FlexVolumeDriver, MountOutcome, NfsDriver,
    VolumeSource, dispatch,
};

use crate::common::{Call, FakeHost};

const SHARE: &str = "nfs.example.com:/export";

fn source(options: &str, sub_path: &str) -> VolumeSource {
    VolumeSource {
        share: SHARE.into(),
        mount_options: options.into(),
        sub_path: sub_path.into(),
        ..Default::default()
    }
}

fn creating(sub_path: &str, mode: &str) -> VolumeSource {
    VolumeSource {
        create_if_necessary: true,
        create_mode: Some(mode.into()),
        ..source("ro,nfsvers=4", sub_path)
    }
}

#[test]
fn option_order_does_not_change_mount_point() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());

    let a = driver.canonical_mount(&source("ro,nfsvers=4,hard", ""));
    let b = driver.canonical_mount(&source("hard,ro,nfsvers=4", ""));
    assert_eq!(a.path(), b.path());

    driver
        .mount(&tmp.path().join("t1"), &source("ro,nfsvers=4,hard", ""))
        .unwrap();
    driver
        .mount(&tmp.path().join("t2"), &source("nfsvers=4,hard,ro", ""))
        .unwrap();
    assert_eq!(host.mount_calls(), 1);
}

#[test]
fn repeated_mount_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let target = tmp.path().join("pod").join("vol");
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    let src = creating("data", "0755");

    let first = driver.mount(&target, &src).unwrap();
    let second = driver.mount(&target, &src).unwrap();

    assert_eq!(first.outcome, MountOutcome::Mounted);
    assert_eq!(second.outcome, MountOutcome::AlreadyMounted);
    assert_eq!(host.mount_calls(), 1);
    assert_eq!(host.unmount_calls(), 0);
    assert_eq!(std::fs::read_link(&target).unwrap(), second.source_path);
}

#[test]
fn existing_link_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let target = tmp.path().join("vol");
    std::os::unix::fs::symlink(tmp.path().join("elsewhere"), &target).unwrap();

    let report = driver.mount(&target, &source("rw", "")).unwrap();
    assert_eq!(std::fs::read_link(&target).unwrap(), report.mount_point);
}

#[test]
fn empty_directory_at_target_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let target = tmp.path().join("vol");
    std::fs::create_dir(&target).unwrap();

    let report = driver.mount(&target, &source("rw", "")).unwrap();
    assert_eq!(std::fs::read_link(&target).unwrap(), report.mount_point);
}

#[test]
fn stale_mount_is_unmounted_once_then_remounted() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let src = source("ro,nfsvers=4", "");
    let mount = driver.canonical_mount(&src);
    host.make_stale(mount.path());

    let report = driver.mount(&tmp.path().join("vol"), &src).unwrap();

    assert_eq!(report.outcome, MountOutcome::Remounted);
    assert_eq!(
        host.calls(),
        vec![
            Call::Unmount(mount.path().to_path_buf()),
            Call::Mount {
                share: SHARE.into(),
                path: mount.path().to_path_buf(),
                options: "nfsvers=4,ro".into(),
            },
        ]
    );
}

#[test]
fn failed_stale_unmount_stops_the_request() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let src = creating("data", "0755");
    let mount = driver.canonical_mount(&src);
    host.make_stale(mount.path());
    host.fail_unmount();
    let target = tmp.path().join("vol");

    let err = driver.mount(&target, &src).unwrap_err();

    assert!(matches!(err, FlexError::StaleMount { .. }));
    assert!(err.to_string().contains("device is busy"));
    assert_eq!(host.unmount_calls(), 1);
    assert_eq!(host.mount_calls(), 0);
    assert!(!mount.path().join("data").exists());
    assert!(std::fs::symlink_metadata(&target).is_err());
}

#[test]
fn mount_failure_leaves_target_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    host.fail_mount();
    let driver = host.driver(tmp.path());
    let target = tmp.path().join("vol");

    let err = driver.mount(&target, &source("rw", "")).unwrap_err();

    assert!(matches!(err, FlexError::MountFailed { .. }));
    assert!(err.to_string().contains("Connection timed out"));
    assert!(std::fs::symlink_metadata(&target).is_err());
}

#[test]
fn missing_sub_path_without_create_names_the_path() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let src = source("ro", "missing");
    let expected = driver.canonical_mount(&src).path().join("missing");
    let target = tmp.path().join("vol");

    let resp = dispatch(
        &driver,
        DriverCall::Mount {
            target: target.clone(),
            options: format!(r#"{{"share":"{SHARE}","mountOptions":"ro","subPath":"missing"}}"#),
        },
    );

    assert_eq!(resp.status, DriverStatus::Failure);
    assert!(resp.message.contains(&expected.display().to_string()));
    assert!(std::fs::symlink_metadata(&target).is_err());
}

#[test]
fn sub_path_is_created_with_requested_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());

    let report = driver
        .mount(&tmp.path().join("vol"), &creating("a/b", "0750"))
        .unwrap();

    let mode = std::fs::metadata(&report.source_path)
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o750);
    assert!(report.source_path.ends_with("a/b"));
}

#[test]
fn unmount_removes_link_but_keeps_share_mounted() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let target = tmp.path().join("vol");
    driver.mount(&target, &source("rw", "")).unwrap();

    let resp = dispatch(
        &driver,
        DriverCall::Unmount {
            target: target.clone(),
        },
    );

    assert_eq!(resp.status, DriverStatus::Success);
    assert!(std::fs::symlink_metadata(&target).is_err());
    assert_eq!(host.unmount_calls(), 0);
}

#[test]
fn unmount_of_missing_target_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());

    let resp = dispatch(
        &driver,
        DriverCall::Unmount {
            target: tmp.path().join("never-mounted"),
        },
    );

    assert_eq!(resp.status, DriverStatus::Failure);
    assert!(resp.message.contains("never-mounted"));
}

#[test]
fn end_to_end_mount_through_dispatch() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("mnt");
    let pods = tmp.path().join("pods").join("uid-1");
    std::fs::create_dir_all(&pods).unwrap();
    let target = pods.join("vol");

    let host = FakeHost::default();
    let driver = host.driver(&root);
    let args: Vec<String> = vec![
        target.display().to_string(),
        r#"{"share":"nfs.example.com:/export","mountOptions":"ro,nfsvers=4","subPath":"data","createIfNecessary":"true","createMode":"0755"}"#.into(),
    ];
    let call = DriverCall::from_args("mount", &args).unwrap();

    let resp = dispatch(&driver, call);
    assert_eq!(resp.status, DriverStatus::Success, "{}", resp.message);
    assert_eq!(resp.message, "Mount completed!");

    let mount_point = root.join("nfs.example.com:/export/options/nfsvers=4,ro");
    let link = std::fs::read_link(&target).unwrap();
    assert_eq!(link, mount_point.join("data"));
    assert_eq!(
        std::fs::metadata(&link).unwrap().permissions().mode() & 0o777,
        0o755
    );
    assert_eq!(
        host.calls(),
        vec![Call::Mount {
            share: SHARE.into(),
            path: mount_point,
            options: "nfsvers=4,ro".into(),
        }]
    );

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["status"], "Success");
    assert!(json.get("capabilities").is_none());
}

#[test]
fn init_and_unknown_verbs() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());

    let init = dispatch(&driver, DriverCall::from_args("init", &[]).unwrap());
    let json = serde_json::to_value(&init).unwrap();
    assert_eq!(json["status"], "Success");
    assert_eq!(json["capabilities"]["attach"], false);

    let other = dispatch(
        &driver,
        DriverCall::from_args("getvolumename", &[]).unwrap(),
    );
    let json = serde_json::to_value(&other).unwrap();
    assert_eq!(json["status"], "Not supported");
}

#[test]
fn lock_without_options_survives_remount() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let mut config = DriverConfig::with_root(tmp.path());
    config.lock_mounts = true;
    let driver = NfsDriver::with_backends(config, Box::new(host.clone()), Box::new(host.clone()));
    let src = source("", "");
    let mount = driver.canonical_mount(&src);

    driver.mount(&tmp.path().join("t1"), &src).unwrap();
    driver.mount(&tmp.path().join("t2"), &src).unwrap();

    let lock = mount.lock_path();
    assert!(lock.is_file());
    assert!(!lock.starts_with(mount.path()));
    assert_eq!(host.mount_calls(), 1);
}

#[test]
fn absolute_sub_path_stays_inside_share() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());

    let report = driver
        .mount(&tmp.path().join("vol"), &creating("/data", "0755"))
        .unwrap();

    assert_eq!(report.source_path, report.mount_point.join("data"));
    assert!(report.source_path.is_dir());
}

#[test]
fn mount_point_lives_under_root() {
    let tmp = tempfile::tempdir().unwrap();
    let host = FakeHost::default();
    let driver = host.driver(tmp.path());
    let mount = driver.canonical_mount(&source("", ""));
    assert_eq!(
        mount.path(),
        Path::new(&format!("{}/{SHARE}/options/", tmp.path().display()))
    );
}
