//! Integration tests for the `slaunchd` binary's exit codes.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use zbus::fdo::{RequestNameFlags, RequestNameReply};

#[test]
fn invalid_bus_name_exits_with_failure() {
    let mut command = cargo_bin_cmd!("slaunchd");
    command.args(["--bus-name", "not a bus name"]);
    command
        .assert()
        .code(1)
        .stderr(contains("slaunchd: "));
}

#[test]
fn held_bus_name_exits_with_failure() {
    if std::env::var_os("DBUS_SESSION_BUS_ADDRESS").is_none() {
        return;
    }
    let bus_name = format!("org.example.SlaunchdHeld.P{}", std::process::id());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime should build");
    let holder = runtime.block_on(async {
        let holder = zbus::Connection::session()
            .await
            .expect("holder should connect");
        let reply = holder
            .request_name_with_flags(bus_name.as_str(), RequestNameFlags::DoNotQueue.into())
            .await
            .expect("holder should claim the name");
        assert_eq!(reply, RequestNameReply::PrimaryOwner);
        holder
    });

    let mut command = cargo_bin_cmd!("slaunchd");
    command.args(["--bus-name", &bus_name]);
    command
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .code(1)
        .stderr(contains(bus_name.as_str()));

    drop(holder);
}
