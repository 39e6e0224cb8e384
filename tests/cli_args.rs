// Tests for command-line parsing and log level selection.
use clap::Parser;
use log::LevelFilter;
use pcheck::cli::{Cli, Command, LOG_ENV};
use pcheck::controller::Template;
use serial_test::serial;
use std::env;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("pcheck").chain(args.iter().copied())).unwrap()
}

#[test]
fn no_subcommand_means_list() {
    assert!(parse(&[]).command.is_none());
}

#[test]
fn update_aliases() {
    let cli = parse(&["update", "notes.md", "--priority", "--completed"]);
    match cli.command {
        Some(Command::Update(args)) => {
            assert!(args.sort);
            assert!(args.done);
            assert!(!args.vacuum);
            assert_eq!(args.file.as_deref(), Some(std::path::Path::new("notes.md")));
        }
        other => panic!("Expected update, got {:?}", other),
    }
}

#[test]
fn add_arguments() {
    let cli = parse(&["add", "TODO.md", "icebox", "-m", "Try it", "-p", "low"]);
    match cli.command {
        Some(Command::Add(args)) => {
            assert_eq!(args.section.as_deref(), Some("icebox"));
            assert_eq!(args.message, "Try it");
            assert_eq!(args.priority.as_deref(), Some("low"));
            assert!(!args.private);
        }
        other => panic!("Expected add, got {:?}", other),
    }
}

#[test]
fn private_add_conflicts_with_file() {
    let args = ["pcheck", "add", "TODO.md", "-m", "x", "--private"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn init_template_parses() {
    match parse(&["init", "--template", "gtd"]).command {
        Some(Command::Init(args)) => assert_eq!(args.template, Template::Gtd),
        other => panic!("Expected init, got {:?}", other),
    }
    assert!(Cli::try_parse_from(["pcheck", "init", "--template", "kanban"]).is_err());
}

#[test]
fn global_flags_after_subcommand() {
    let cli = parse(&["validate", "a.md", "b.md", "--strict", "--no-color", "--indent-size", "4"]);
    assert!(cli.no_color);
    assert_eq!(cli.indent_size, Some(4));
    match cli.command {
        Some(Command::Validate(args)) => {
            assert_eq!(args.files.len(), 2);
            assert!(args.strict);
        }
        other => panic!("Expected validate, got {:?}", other),
    }
}

#[test]
#[serial]
fn verbosity_sets_log_level() {
    unsafe {
        env::remove_var(LOG_ENV);
    }
    assert_eq!(parse(&[]).log_level(), LevelFilter::Warn);
    assert_eq!(parse(&["-v"]).log_level(), LevelFilter::Info);
    assert_eq!(parse(&["-vv", "list"]).log_level(), LevelFilter::Debug);
}

#[test]
#[serial]
fn env_overrides_verbosity() {
    unsafe {
        env::set_var(LOG_ENV, "trace");
    }
    let level = parse(&["-v"]).log_level();
    unsafe {
        env::remove_var(LOG_ENV);
    }
    assert_eq!(level, LevelFilter::Trace);
}
