#![allow(clippy::unwrap_used)]
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::{
    predicate::str::{contains, is_empty},
    PredicateBooleanExt,
};
use test_context::TestContext;

mod web_client;

#[test]
fn test_profile_arg() {
    // --profile-path wins over PETSIGNAL_PROFILE
    let ctx = TestContext::new();
    let mut cmd = ctx.command();

    let assert = cmd
        .env("PETSIGNAL_PROFILE", "wrong_profile")
        .args(["--profile-path", "test_profile_arg"])
        .arg("config")
        .assert();

    assert
        .success()
        .stdout(
            contains(r#""profile_name": "test_profile_arg""#)
                .and(contains(r#""credentials_path""#)),
        )
        .stderr(is_empty());
}

#[test]
fn test_profile_env() {
    let ctx = TestContext::new();
    let mut cmd = ctx.command();

    let assert = cmd
        .env("PETSIGNAL_PROFILE", "test_profile_env")
        .arg("config")
        .assert();

    assert
        .success()
        .stdout(
            contains(r#""profile_name": "test_profile_env""#)
                .and(contains(r#""profile_exists": false"#)),
        )
        .stderr(is_empty());
}

#[test]
fn test_api_url_env_beats_profile() {
    let ctx = TestContext::with_api("http://from-profile:8080");

    ctx.command()
        .env("PETSIGNAL_API_URL", "http://from-env:9090")
        .arg("config")
        .assert()
        .success()
        .stdout(contains(r#""api_url": "http://from-env:9090""#));

    ctx.command()
        .arg("config")
        .assert()
        .success()
        .stdout(contains(r#""api_url": "http://from-profile:8080""#));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let ctx = TestContext::new();

    ctx.command()
        .args(["init", "--page-size", "5"])
        .assert()
        .success()
        .stdout(contains("written to"));
    assert!(ctx.profile_path().exists());

    ctx.command().arg("init").assert().failure();

    ctx.command()
        .args(["init", "--force", "--page-size", "7"])
        .assert()
        .success();

    ctx.command()
        .arg("config")
        .assert()
        .success()
        .stdout(contains(r#""page_size": 7"#));
}

#[test]
fn test_whoami_requires_login() {
    let ctx = TestContext::new();

    ctx.command()
        .arg("whoami")
        .assert()
        .failure()
        .stderr(contains("Not logged in"));
}

#[test]
fn test_no_command_prints_help() {
    let mut cmd = Command::cargo_bin("petsignal").unwrap();

    cmd.env_remove("PETSIGNAL_PROFILE")
        .assert()
        .success()
        .stdout(contains("Usage"));
}

#[test]
fn test_profile_list_shows_login() {
    let ctx = TestContext::with_api("http://alerts.test");
    ctx.login_as("ana", "secret1");

    ctx.command()
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(contains("test (http://alerts.test, logged in as ana)").and(contains("* default")));
}

#[test]
fn test_profile_use_switches_and_creates() {
    let ctx = TestContext::new();

    ctx.command()
        .env_remove("PETSIGNAL_PROFILE")
        .args(["profile", "use", "staging"])
        .assert()
        .success()
        .stdout(
            contains("Created new profile: staging")
                .and(contains("Switched to profile: staging")),
        );

    ctx.command()
        .env_remove("PETSIGNAL_PROFILE")
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(contains("* staging").and(contains("  default")));
}

#[test]
fn test_unsafe_profile_name_is_rejected() {
    let ctx = TestContext::new();

    ctx.command()
        .env("PETSIGNAL_PROFILE", "../elsewhere")
        .arg("config")
        .assert()
        .failure()
        .stderr(contains("Invalid profile name"));
}
