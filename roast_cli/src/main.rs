//! Roaster-twin CLI entry point: logging setup, config loading, dispatch.

mod cli;
mod error_fmt;
mod run;

use clap::Parser;
use cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Cli, logging: &roast_config::Logging) {
    let level = logging.level.clone().unwrap_or_else(|| args.log_level.clone());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    if let Some(path) = &logging.file {
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(".", path),
            Some("hourly") => tracing_appender::rolling::hourly(".", path),
            _ => tracing_appender::rolling::never(".", path),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .json()
            .init();
    } else if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> eyre::Result<roast_config::Config> {
    if !args.config.exists() {
        tracing::debug!(path = ?args.config, "config file absent; using defaults");
        return Ok(roast_config::Config::default());
    }
    let text = std::fs::read_to_string(&args.config)
        .wrap_err_with(|| format!("read config {:?}", args.config))?;
    let cfg = roast_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("parse config {:?}: {}", args.config, e))?;
    cfg.validate()
        .wrap_err_with(|| format!("invalid config {:?}", args.config))?;
    Ok(cfg)
}

fn main() {
    let args = Cli::parse();
    let _ = JSON_MODE.set(args.json);
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    let exit = match try_main(&args) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            if *JSON_MODE.get().unwrap_or(&false) {
                eprintln!("{}", error_fmt::to_json(&e));
            } else {
                eprintln!("Error: {e:#}");
                eprintln!("{}", error_fmt::humanize(&e));
            }
            1
        }
    };
    std::process::exit(exit);
}

fn try_main(args: &Cli) -> eyre::Result<()> {
    let cfg = {
        // Config errors must be reportable even before logging is up; parse
        // first with a best-effort default on absence, then init logging.
        let cfg = load_config(args)?;
        init_logging(args, &cfg.logging);
        cfg
    };

    match &args.cmd {
        Commands::Run {
            mode,
            duration_min,
            heater,
            fan,
            mass_g,
            profile,
            profile_csv,
            seed,
            speedup,
            output,
        } => run::run_roast_cmd(
            &cfg,
            run::RunArgs {
                mode: *mode,
                duration_min: *duration_min,
                heater: *heater,
                fan: *fan,
                mass_g: *mass_g,
                profile: *profile,
                profile_csv: profile_csv.clone(),
                seed: *seed,
                speedup: *speedup,
                output: output.clone(),
                json: args.json,
            },
        ),
        Commands::Profile {
            kind,
            seed,
            total_min,
            start_c,
            end_c,
        } => run::profile_cmd(*kind, *seed, *total_min, *start_c, *end_c, args.json),
        Commands::SelfCheck => run::self_check(&cfg, args.json),
    }
}
