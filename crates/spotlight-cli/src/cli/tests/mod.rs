//! CLI parse tests.

use super::{with_overrides, Cli, CliCommand};
use clap::Parser;
use spotlight_core::config::SpotlightConfig;
use std::path::{Path, PathBuf};

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn cli_parse_run_defaults() {
    match parse(&["spotlight", "run"]) {
        CliCommand::Run { workers, output } => {
            assert!(workers.is_none());
            assert!(output.is_none());
        }
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_overrides() {
    match parse(&["spotlight", "run", "--workers", "8", "--output", "/tmp/img"]) {
        CliCommand::Run { workers, output } => {
            assert_eq!(workers, Some(8));
            assert_eq!(output.as_deref(), Some(Path::new("/tmp/img")));
        }
        _ => panic!("expected Run with overrides"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["spotlight", "status"]) {
        CliCommand::Status { output } => assert!(output.is_none()),
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_probe() {
    match parse(&["spotlight", "probe", "de"]) {
        CliCommand::Probe { country } => assert_eq!(country, "de"),
        _ => panic!("expected Probe"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["spotlight", "checksum", "images/Lake.jpg"]) {
        CliCommand::Checksum { path } => assert_eq!(path, "images/Lake.jpg"),
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_rejects_missing_probe_country() {
    assert!(Cli::try_parse_from(["spotlight", "probe"]).is_err());
}

#[test]
fn cli_rejects_non_numeric_workers() {
    assert!(Cli::try_parse_from(["spotlight", "run", "--workers", "many"]).is_err());
}

#[test]
fn overrides_apply_and_validate() {
    let cfg = with_overrides(SpotlightConfig::default(), Some(2), Some(PathBuf::from("out"))).unwrap();
    assert_eq!(cfg.workers, 2);
    assert_eq!(cfg.output_dir, PathBuf::from("out"));

    assert!(with_overrides(SpotlightConfig::default(), Some(0), None).is_err());
}
