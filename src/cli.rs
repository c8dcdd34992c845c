//! # Command Line Interface / 命令行接口
//!
//! Builds the `build-matrix` command line with localized help texts and
//! dispatches to the `run`, `init` and `clean` commands.
//!
//! 构建带有本地化帮助文本的 `build-matrix` 命令行，
//! 并分派到 `run`、`init` 和 `clean` 命令。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf};

use crate::infra::t;

pub mod commands;

use commands::run::RunOptions;

/// Default name of the matrix configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "BuildMatrix.toml";

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
pub fn pre_parse_language<I: IntoIterator<Item = String>>(args: I) -> Option<String> {
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--lang" {
            return args.next();
        }
        if let Some(lang) = arg.strip_prefix("--lang=") {
            return Some(lang.to_string());
        }
    }
    None
}

/// Builds the full command line definition using the current locale for help texts.
pub fn build_cli() -> Command {
    Command::new("build-matrix")
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
        .subcommand(
            Command::new("run")
                .about(t!("cli.run.about").to_string())
                .arg(config_arg())
                .arg(
                    Arg::new("work-dir")
                        .long("work-dir")
                        .help(t!("cli.run.work_dir").to_string())
                        .value_name("DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.run.jobs").to_string())
                        .value_name("JOBS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("fail-fast")
                        .long("fail-fast")
                        .help(t!("cli.run.fail_fast").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("total-runners")
                        .long("total-runners")
                        .help(t!("cli.run.total_runners").to_string())
                        .value_name("TOTAL_RUNNERS")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("runner-index"),
                )
                .arg(
                    Arg::new("runner-index")
                        .long("runner-index")
                        .help(t!("cli.run.runner_index").to_string())
                        .value_name("RUNNER_INDEX")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set)
                        .requires("total-runners"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help(t!("cli.run.dry_run").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("cli.run.html").to_string())
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("cli.run.json").to_string())
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.init.about").to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.init.non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help(t!("cli.init.output").to_string())
                        .value_name("FILE")
                        .default_value(DEFAULT_CONFIG_FILE)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.init.force").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about(t!("cli.clean.about").to_string())
                .arg(config_arg())
                .arg(
                    Arg::new("work-dir")
                        .long("work-dir")
                        .help(t!("cli.run.work_dir").to_string())
                        .value_name("DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("cli.config").to_string())
        .value_name("CONFIG")
        .default_value(DEFAULT_CONFIG_FILE)
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn path_arg(matches: &ArgMatches, id: &str) -> PathBuf {
    matches.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

/// Extracts the `run` options from parsed arguments.
pub fn run_options(matches: &ArgMatches) -> RunOptions {
    RunOptions {
        config: path_arg(matches, "config"),
        work_dir: path_arg(matches, "work-dir"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        fail_fast: matches.get_flag("fail-fast"),
        total_runners: matches.get_one::<usize>("total-runners").copied(),
        runner_index: matches.get_one::<usize>("runner-index").copied(),
        dry_run: matches.get_flag("dry-run"),
        html: matches.get_one::<PathBuf>("html").cloned(),
        json: matches.get_one::<PathBuf>("json").cloned(),
        lang: matches.get_one::<String>("lang").cloned(),
    }
}

/// Parses the process arguments and runs the selected command.
pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    match pre_parse_language(env::args()) {
        Some(language) => crate::set_language(&language),
        None => crate::init(),
    }

    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => commands::run::execute(run_options(run_matches)).await,
        Some(("init", init_matches)) => commands::init::execute(
            path_arg(init_matches, "output"),
            init_matches.get_flag("force"),
            init_matches.get_flag("non-interactive"),
        ),
        Some(("clean", clean_matches)) => commands::clean::execute(
            &path_arg(clean_matches, "config"),
            &path_arg(clean_matches, "work-dir"),
        ),
        // `subcommand_required` makes clap print help and exit first.
        _ => Ok(()),
    }
}

