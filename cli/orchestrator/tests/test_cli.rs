//! Runs the `wsbridge` binary against a temporary configuration.

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &Path) -> PathBuf {
    std::fs::write(
        dir.join("calculator.json"),
        r#"{
            "name": "Calculator",
            "namespace": "urn:calculator/",
            "operations": [
                {
                    "name": "Add",
                    "arguments": [
                        { "name": "a", "native_type": "int" },
                        { "name": "b", "native_type": "int" }
                    ],
                    "return": { "name": "return", "native_type": "int" }
                }
            ]
        }"#,
    )
    .expect("write definition");

    let config = dir.join("wsbridge.toml");
    std::fs::write(
        &config,
        r#"
            [logging]
            level = "warn"

            [[services]]
            name = "Calculator"
            resource = "calculator.json"
        "#,
    )
    .expect("write config");
    config
}

fn wsbridge() -> Command { Command::new(assert_cmd::cargo::cargo_bin!("wsbridge")) }

#[test]
fn wsdl_prints_the_document() {
    let tmp = tempdir().expect("temporary directory");
    let config = write_config(tmp.path());

    let mut cmd = wsbridge();
    cmd.args(["wsdl", "--service", "Calculator", "--endpoint", "http://localhost/calc", "--config"])
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#"<soap:address location="http://localhost/calc"/>"#))
        .stdout(predicate::str::contains(r#"<operation name="Add" parameterOrder="a b">"#));
}

#[test]
fn wsdl_writes_output_file_with_stylesheet() {
    let tmp = tempdir().expect("temporary directory");
    let config = write_config(tmp.path());
    let out = tmp.path().join("calculator.wsdl");

    let mut cmd = wsbridge();
    cmd.args(["wsdl", "--service", "Calculator", "--stylesheet", "wsdl.xsl", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&out);
    cmd.assert().success().stdout(predicate::str::is_empty());

    let document = std::fs::read_to_string(&out).expect("output written");
    assert!(document.contains(r#"<?xml-stylesheet type="text/xsl" href="wsdl.xsl"?>"#));
    assert!(document.contains(r#"<soap:address location=""/>"#));
}

#[test]
fn types_lists_resolved_mappings() {
    let tmp = tempdir().expect("temporary directory");
    let config = write_config(tmp.path());

    let mut cmd = wsbridge();
    cmd.args(["types", "--service", "Calculator", "--config"]).arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("int => {http://www.w3.org/2001/XMLSchema}int"));
}

#[test]
fn unknown_service_fails() {
    let tmp = tempdir().expect("temporary directory");
    let config = write_config(tmp.path());

    let mut cmd = wsbridge();
    cmd.args(["wsdl", "--service", "Billing", "--config"]).arg(&config);
    cmd.assert().failure().stderr(predicate::str::contains("No webservice with name 'Billing' found"));
}

#[test]
fn configured_log_file_receives_events() {
    let tmp = tempdir().expect("temporary directory");
    let config = write_config(tmp.path());
    let contents = std::fs::read_to_string(&config).expect("read config");
    std::fs::write(&config, contents.replace(r#"level = "warn""#, "level = \"info\"\n            file = \"wsbridge.log\""))
        .expect("rewrite config");

    let mut cmd = wsbridge();
    cmd.env_remove("RUST_LOG").args(["types", "--service", "Calculator", "--config"]).arg(&config);
    cmd.assert().success().stderr(predicate::str::contains("loaded service definition").not());

    let log = std::fs::read_to_string(tmp.path().join("wsbridge.log")).expect("log file created");
    assert!(log.contains("loaded service definition"));
}
