//! status-e2e: run end-to-end suites for the Status mobile app
//!
//! ## Usage
//!
//! ```bash
//! status-e2e list                                   # Suites and cases
//! status-e2e run --config devices.yaml              # Run the default suite
//! status-e2e run --filter 702775 --report out.json  # One case, JSON report
//! status-e2e link convert https://status.app/u#zQ3sh...
//! ```

use clap::Parser;
use status_e2e::BuiltinSuite;
use status_e2e_cli::{
    logging, runner, Cli, CliConfig, CliResult, Commands, LinkArgs, LinkCommand, ListArgs,
    Reporter, RunArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config)?;
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match cli.command {
        Commands::Run(args) => run_suite(&reporter, &args),
        Commands::List(args) => run_list(&reporter, &args),
        Commands::Link(args) => run_link(&reporter, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
        .with_log_json(cli.log_json)
}

fn run_suite(reporter: &Reporter, args: &RunArgs) -> CliResult<()> {
    let suite: BuiltinSuite = args.suite.parse()?;
    let config = runner::load_config(args.config.as_deref())?;
    tracing::info!(suite = %suite, devices = suite.device_count(), url = %config.appium_url, "connecting");
    let group = runner::connect(&config, suite.device_count())?;

    let report = runner::execute(suite, args.filter.as_deref(), &group);
    if let Err(e) = group.quit_all() {
        tracing::warn!(error = %e, "failed to quit sessions");
    }

    reporter.report(&report);
    if let Some(path) = &args.report {
        runner::write_report(&report, path)?;
    }
    runner::check_report(&report)
}

fn run_list(reporter: &Reporter, args: &ListArgs) -> CliResult<()> {
    let entries = runner::catalog();
    if args.json {
        reporter.always(&serde_json::to_string_pretty(&entries).map_err(status_e2e::E2eError::from)?);
    } else {
        reporter.always(runner::render_catalog(&entries).trim_end());
    }
    Ok(())
}

fn run_link(reporter: &Reporter, args: &LinkArgs) -> CliResult<()> {
    let link = match &args.command {
        LinkCommand::Build {
            key,
            kind,
            payload,
            scheme,
        } => runner::build_link(key, (*kind).into(), payload.as_deref(), (*scheme).into())?,
        LinkCommand::Convert { link, to } => runner::convert_link(link, (*to).into())?,
    };
    reporter.always(&link);
    Ok(())
}
