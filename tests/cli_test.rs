//! Tests for argument parsing, settings layering and exit codes

use std::fs;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use mm2csv::application::ApplicationError;
use mm2csv::cli::commands::{execute, load_settings};
use mm2csv::cli::{Cli, CliError};
use mm2csv::config::Settings;
use mm2csv::domain::DomainError;
use mm2csv::exitcode;
use mm2csv::infrastructure::archive::ArchiveError;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("mm2csv").chain(args.iter().copied())).unwrap()
}

#[test]
fn given_all_flags_when_parsing_then_fields_are_set() {
    // Act
    let cli = parse(&[
        "map.mind", "-o", "out.csv", "--numbers", "--ids", "--leaf", "-d", "-d",
    ]);

    // Assert
    assert_eq!(cli.file, Some(PathBuf::from("map.mind")));
    assert_eq!(cli.output, Some(PathBuf::from("out.csv")));
    assert!(cli.numbers && cli.ids && cli.leaf);
    assert_eq!(cli.debug, 2);
}

#[test]
fn given_no_file_when_parsing_then_usage_error() {
    let result = Cli::try_parse_from(["mm2csv", "--numbers"]);
    assert!(result.is_err());
}

#[test]
fn given_generate_without_file_when_parsing_then_accepted() {
    let cli = parse(&["--generate", "bash"]);
    assert!(cli.file.is_none());
    assert!(cli.generator.is_some());
}

#[test]
fn given_config_file_and_flags_when_loading_then_flags_switch_columns_on() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("mm2csv.toml");
    fs::write(&config, "numbers = true\nleaf = false\n").unwrap();
    let config_arg = config.to_string_lossy().to_string();

    // Act
    let settings = load_settings(&parse(&["map.mind", "-c", &config_arg, "--leaf"])).unwrap();

    // Assert
    assert!(settings.numbers);
    assert!(settings.leaf);
}

#[test]
fn given_missing_config_file_when_loading_then_config_exit_code() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    // Act
    let err = Settings::load(Some(&missing)).unwrap_err();

    // Assert
    assert!(matches!(err, ApplicationError::Config { .. }));
    assert_eq!(CliError::from(err).exit_code(), exitcode::CONFIG);
}

#[test]
fn given_unknown_config_key_when_loading_then_config_error() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("mm2csv.toml");
    fs::write(&config, "numbrs = true\n").unwrap();

    // Act
    let result = Settings::load(Some(&config));

    // Assert
    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_output_equal_to_input_when_executing_then_invalid_args() {
    // Act
    let result = execute(&parse(&["map.mind", "-o", "map.mind"]));

    // Assert
    let err = result.unwrap_err();
    assert!(matches!(err, CliError::InvalidArgs(_)));
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_output_spelled_differently_but_same_as_input_when_executing_then_invalid_args() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("map.mind");
    fs::write(&input, b"not touched").unwrap();
    let input_arg = input.to_string_lossy().to_string();
    let output_arg = temp
        .path()
        .join(".")
        .join("map.mind")
        .to_string_lossy()
        .to_string();

    // Act
    let result = execute(&parse(&[&input_arg, "-o", &output_arg]));

    // Assert
    assert!(matches!(result, Err(CliError::InvalidArgs(_))));
    assert_eq!(fs::read(&input).unwrap(), b"not touched");
}

#[cfg(unix)]
#[test]
fn given_output_symlinked_to_input_when_executing_then_invalid_args() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("map.mind");
    fs::write(&input, b"not touched").unwrap();
    let link = temp.path().join("alias.csv");
    std::os::unix::fs::symlink(&input, &link).unwrap();
    let input_arg = input.to_string_lossy().to_string();
    let link_arg = link.to_string_lossy().to_string();

    // Act
    let result = execute(&parse(&[&input_arg, "-o", &link_arg]));

    // Assert
    assert!(matches!(result, Err(CliError::InvalidArgs(_))));
    assert_eq!(fs::read(&input).unwrap(), b"not touched");
}

#[rstest]
#[case::incorrect_format(
    ApplicationError::Domain(DomainError::IncorrectFormat { reason: "missing `root` key".into() }),
    exitcode::DATAERR
)]
#[case::missing_map(ApplicationError::MissingMapFile(PathBuf::from("x.mind")), exitcode::DATAERR)]
#[case::missing_input(
    ApplicationError::Archive(ArchiveError::Open {
        path: PathBuf::from("x.mind"),
        source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    }),
    exitcode::NOINPUT
)]
#[case::unreadable_input(
    ApplicationError::Archive(ArchiveError::Open {
        path: PathBuf::from("x.mind"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    }),
    exitcode::IOERR
)]
#[case::io(
    ApplicationError::OperationFailed {
        context: "write output: out.csv".into(),
        source: Box::new(io::Error::new(io::ErrorKind::Other, "disk full")),
    },
    exitcode::IOERR
)]
fn given_application_error_when_mapping_then_exit_code_matches(
    #[case] error: ApplicationError,
    #[case] expected: i32,
) {
    assert_eq!(CliError::from(error).exit_code(), expected);
}

#[test]
fn given_incorrect_format_when_displayed_then_mentions_mind_file() {
    let err = CliError::from(ApplicationError::Domain(DomainError::IncorrectFormat {
        reason: "missing `root` key".into(),
    }));

    assert!(err
        .to_string()
        .starts_with("incorrect data format, is this a correct .mind file?"));
}
