//! Swapload CLI - Command line interface
//!
//! Project-based execution - loader settings come from swapload.json

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, Level};

mod config;
mod logging;
mod platform;

use crate::config::{parse_log_level, LogConfig};
use crate::logging::LogFormat;
use crate::platform::{print_error, print_observation, print_reports, print_resolved, print_stale, ResolvedRow};
use swapload_api::{
    build_loader, get_config, init_config, loader_factory, system_parent, LoaderBuilder, LoaderConfig,
    ModuleName, Ordering, RunConfig, Staleness, SwaploadError, WatchSession,
};

#[derive(Parser)]
#[command(
    name = "swapload",
    about = "Delegating module loader with hot replacement",
    version = "0.1.0"
)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// silent, error, warn, info, debug, trace (overrides logLevel in swapload.json)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve modules and show where each one came from
    Resolve {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,

        /// Project file
        #[arg(long, default_value = "swapload.json")]
        config: PathBuf,

        /// Override the delegation order (local-first, parent-first)
        #[arg(long)]
        ordering: Option<Ordering>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load one module through two independent loaders and compare the handles
    Compare {
        #[arg(value_name = "NAME")]
        name: String,

        /// Store directory of the first loader
        #[arg(long)]
        left: PathBuf,

        /// Store directory of the second loader
        #[arg(long)]
        right: PathBuf,
    },

    /// Run hot-replace workers on a module
    Watch {
        #[arg(value_name = "NAME")]
        name: String,

        /// Project file
        #[arg(long, default_value = "swapload.json")]
        config: PathBuf,

        /// Stop after this many seconds (default: until all workers stop)
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.log_format == LogFormat::Json;

    if let Err(e) = run(cli) {
        print_error(&e, json_errors);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SwaploadError> {
    let project = match &cli.command {
        Command::Resolve { config, .. } | Command::Watch { config, .. } => Some(read_project(config)?),
        Command::Compare { .. } => None,
    };

    let level_name = cli
        .log_level
        .as_deref()
        .or_else(|| project.as_ref().and_then(|p| p.log_level.as_deref()));
    let level = match level_name {
        Some(name) => parse_log_level(name)
            .ok_or_else(|| SwaploadError::Config(format!("unknown log level '{}'", name)))?,
        None => Level::WARN,
    };
    let log_config = match &project {
        Some(project) => LogConfig::from_levels(level, &project.log_levels).map_err(SwaploadError::Config)?,
        None => LogConfig::with_global(level),
    };
    logging::init_with_file(&log_config, cli.log_format, cli.log_file.as_deref())
        .map_err(|e| SwaploadError::Io(format!("cannot initialize logging: {}", e)))?;

    match (cli.command, project) {
        (Command::Resolve { names, ordering, json, .. }, Some(mut project)) => {
            if let Some(ordering) = ordering {
                project.loader.ordering = ordering;
            }
            init_config(project)?;
            handle_resolve(&names, json)
        }
        (Command::Watch { name, duration_secs, .. }, Some(project)) => {
            init_config(project)?;
            handle_watch(&name, duration_secs)
        }
        (Command::Compare { name, left, right }, _) => handle_compare(&name, &left, &right),
        _ => Err(SwaploadError::Config("missing project configuration".to_string())),
    }
}

/// Read swapload.json
fn read_project(path: &Path) -> Result<RunConfig, SwaploadError> {
    if !path.exists() {
        return Err(SwaploadError::Config(format!(
            "'{}' not found; the current directory is not a swapload project",
            path.display()
        )));
    }
    RunConfig::load(path)
}

fn handle_resolve(names: &[String], json: bool) -> Result<(), SwaploadError> {
    let config = get_config()?;
    let loader = build_loader(config, system_parent(config));
    info!(target: "swapload::cli", loader = %loader.id(), ordering = %loader.ordering(), "resolving");

    let mut rows = Vec::new();
    let mut failed = false;
    for raw in names {
        match ModuleName::new(raw).and_then(|name| loader.resolve(&name)) {
            Ok(resolved) => rows.push(ResolvedRow::new(&resolved)),
            Err(e) => {
                print_error(&SwaploadError::from(e), json);
                failed = true;
            }
        }
    }

    print_resolved(&rows, json);
    if failed {
        process::exit(1);
    }
    Ok(())
}

fn handle_compare(name: &str, left: &Path, right: &Path) -> Result<(), SwaploadError> {
    let name = ModuleName::new(name)?;
    let local_first = |root: &Path| {
        LoaderBuilder::new(LoaderConfig {
            store_root: root.to_path_buf(),
            ordering: Ordering::LocalFirst,
            ..LoaderConfig::default()
        })
        .logged(true)
        .build()
    };
    let left_loader = local_first(left);
    let right_loader = local_first(right);

    let left_resolved = left_loader.resolve(&name)?;
    let right_resolved = right_loader.resolve(&name)?;
    print_resolved(
        &[ResolvedRow::new(&left_resolved), ResolvedRow::new(&right_resolved)],
        false,
    );

    let same_content = left_resolved.handle.digest() == right_resolved.handle.digest();
    println!("same content: {}", same_content);
    println!("same handle:  {}", left_resolved.handle == right_resolved.handle);

    let instance = right_resolved.handle.instantiate();
    match left_resolved.handle.cast(&instance) {
        Ok(_) => println!("cast across loaders: accepted"),
        Err(e) => println!("cast across loaders: {} ({})", e.kind(), e),
    }
    Ok(())
}

fn handle_watch(name: &str, duration_secs: Option<u64>) -> Result<(), SwaploadError> {
    let config = get_config()?;
    let module = ModuleName::new(name)?;
    let factory = loader_factory(config, system_parent(config));
    let mut session = WatchSession::start(module, config.harness.clone(), config.hot_replace, factory)?;
    info!(
        target: "swapload::cli",
        module = %session.module(),
        mode = ?session.mode(),
        workers = session.harness().len(),
        "watching"
    );

    let deadline = duration_secs.map(|secs| Instant::now() + Duration::from_secs(secs));
    let tick = Duration::from_millis(config.harness.interval_ms.clamp(50, 1000));
    let mut last_stale: Vec<(ModuleName, Staleness)> = Vec::new();
    loop {
        thread::sleep(tick);
        for observation in session.harness().observations() {
            print_observation(&observation);
        }

        let stale = session.poll()?;
        let key: Vec<_> = stale
            .iter()
            .map(|m| (m.handle.name().clone(), m.staleness))
            .collect();
        if key != last_stale {
            print_stale(&stale);
            last_stale = key;
        }

        if session.harness().running() == 0 {
            break;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }
    }

    for observation in session.harness().observations() {
        print_observation(&observation);
    }
    let reports = session.finish()?;
    print_reports(&reports);
    Ok(())
}
