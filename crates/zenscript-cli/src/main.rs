mod cli;
mod commands;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use cli::{CheckParams, QueryParams, TreeParams, build_cli, verbosity};

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_logging(verbosity(&matches));

    let result = match matches.subcommand() {
        Some(("tree", m)) => {
            let params = TreeParams::from_matches(m);
            commands::tree::run(params.into()).map(|()| true)
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into())
        }
        Some(("query", m)) => {
            let params = QueryParams::from_matches(m);
            commands::query::run(params.into()).map(|()| true)
        }
        _ => unreachable!("clap should have caught this"),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// `ZENSCRIPT_LOG` overrides the level picked by `-v`.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "warn,zenscript=debug,zenscript_syntax=debug",
        _ => "warn,zenscript=trace,zenscript_syntax=trace",
    };
    let filter = EnvFilter::try_from_env("ZENSCRIPT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity > 0)
        .with_writer(std::io::stderr)
        .init();
}
