//! # Command Line Interface / 命令行接口
//!
//! Builds the `clap` command tree with localized help text and dispatches to
//! the flow in [`commands`].

pub mod commands;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::core::models::PhaseKind;
use crate::infra::{logging, t};

/// Looks for `--lang <VALUE>` or `--lang=<VALUE>` before the full CLI is built,
/// so help text can already be localized.
fn pre_parse_language(args: &[String]) -> Option<String> {
    args.iter().enumerate().find_map(|(pos, arg)| {
        if arg == "--lang" {
            args.get(pos + 1).cloned()
        } else {
            arg.strip_prefix("--lang=").map(str::to_string)
        }
    })
}

fn build_cli() -> Command {
    Command::new("cxml-pipeline")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("project-dir")
                .long("project-dir")
                .help(t!("cli.project_dir").to_string())
                .value_name("PROJECT_DIR")
                .default_value(".")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config").to_string())
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(Command::new("build").about(t!("cli.build_about").to_string()))
        .subcommand(Command::new("deps").about(t!("cli.deps_about").to_string()))
        .subcommand(
            Command::new("test")
                .about(t!("cli.test_about").to_string())
                .arg(
                    Arg::new("test-types")
                        .long("test-types")
                        .help(t!("cli.test_types").to_string())
                        .value_name("TYPE")
                        .num_args(1..)
                        .value_parser(clap::value_parser!(PhaseKind))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help(t!("cli.verbose").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.init_about").to_string())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

/// Options shared by every subcommand.
pub struct GlobalArgs {
    pub project_dir: String,
    pub config: Option<PathBuf>,
    /// `true` when `--lang` was given, so `Pipeline.toml` must not override it.
    pub lang_pinned: bool,
}

impl GlobalArgs {
    fn from_matches(matches: &ArgMatches, lang_pinned: bool) -> Self {
        Self {
            project_dir: matches
                .get_one::<String>("project-dir")
                .cloned()
                .unwrap_or_else(|| ".".to_string()),
            config: matches.get_one::<PathBuf>("config").cloned(),
            lang_pinned,
        }
    }
}

/// Parses the process arguments and runs the selected flow.
pub async fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    let lang = pre_parse_language(&args);
    match &lang {
        Some(lang) => crate::set_language(lang),
        None => crate::init(),
    }

    let matches = build_cli().get_matches_from(&args);

    let Some((name, sub)) = matches.subcommand() else {
        return Ok(ExitCode::SUCCESS);
    };
    let globals = GlobalArgs::from_matches(sub, lang.is_some());
    logging::init(name == "test" && sub.get_flag("verbose"));

    match name {
        "build" => commands::build::execute(&globals).await,
        "deps" => commands::deps::execute(&globals).await,
        "test" => {
            let phases: Vec<PhaseKind> = sub
                .get_many::<PhaseKind>("test-types")
                .map(|values| values.copied().collect())
                .unwrap_or_default();
            let verbose = sub.get_flag("verbose");
            commands::test::execute(&globals, &phases, verbose).await
        }
        "init" => commands::init::execute(&globals, sub.get_flag("force")),
        _ => Ok(ExitCode::SUCCESS),
    }
}
