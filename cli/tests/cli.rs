use serde_json::Value;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Run the binary in `dir` so only a config placed there is picked up
fn stackgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stackgen"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .unwrap()
}

#[test]
fn test_failed_lookup_exits_non_zero_with_empty_stdout() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("stackgen.toml"),
        format!("ip_lookup_url = \"{url}\"\nip_lookup_timeout_secs = 2\n"),
    )
    .unwrap();

    let output = stackgen(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Could not determine your public IP address"));
}

#[test]
fn test_given_source_cidr_prints_json_document() {
    let dir = tempdir().unwrap();

    let output = stackgen(dir.path(), &["--source-cidr", "203.0.113.7"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.ends_with("}\n"));

    let document: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        document["Resources"]["SecurityGroup"]["Properties"]["SecurityGroupIngress"][0]["CidrIp"],
        "203.0.113.7/32"
    );
}

#[test]
fn test_yaml_format_is_selectable() {
    let dir = tempdir().unwrap();

    let output = stackgen(
        dir.path(),
        &["--format", "yaml", "--source-cidr", "203.0.113.7"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("AWS::EC2::Instance"));
    assert!(!stdout.starts_with('{'));
}

#[test]
fn test_invalid_config_exits_non_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "ip_lookup_timeout_secs = 0\n").unwrap();

    let output = stackgen(
        dir.path(),
        &["--config", path.to_str().unwrap(), "--source-cidr", "203.0.113.7"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
