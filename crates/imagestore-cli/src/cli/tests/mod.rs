//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_populate() {
    match parse(&["imagestore", "populate"]).command {
        CliCommand::Populate { report } => assert!(!report),
        _ => panic!("expected Populate"),
    }
    match parse(&["imagestore", "populate", "--report"]).command {
        CliCommand::Populate { report } => assert!(report),
        _ => panic!("expected Populate"),
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["imagestore", "status"]).command {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_path() {
    match parse(&["imagestore", "path", "4.8"]).command {
        CliCommand::Path { version } => assert_eq!(version, "4.8"),
        _ => panic!("expected Path"),
    }
}

#[test]
fn cli_parse_versions() {
    assert!(matches!(
        parse(&["imagestore", "versions"]).command,
        CliCommand::Versions
    ));
}

#[test]
fn cli_parse_global_data_dir() {
    let cli = parse(&["imagestore", "status", "--data-dir", "/srv/images"]);
    assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/images")));
    let cli = parse(&["imagestore", "--data-dir", "/tmp/x", "populate"]);
    assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    assert!(parse(&["imagestore", "versions"]).data_dir.is_none());
}

#[test]
fn cli_parse_rejects_missing_version() {
    assert!(Cli::try_parse_from(["imagestore", "path"]).is_err());
}
