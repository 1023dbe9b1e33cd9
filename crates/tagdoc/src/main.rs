use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tagdoc::config::{CONFIG_FILENAME, LogLevel};
use tagdoc::{ClangProvider, Config};

#[derive(Parser, Debug)]
#[command(name = "tagdoc", version, about)]
struct Args {
    /// Configuration file.
    #[arg(long, short, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Log at debug level, whatever the configuration says.
    #[arg(long, short)]
    verbose: bool,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Clang executable used for parsing.
    #[arg(long, default_value = "clang")]
    clang: String,
}

fn init_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) {
    let directive = level.directive();

    let file_layer = log_file.map(|path| {
        let file_appender = tracing_appender::rolling::never(
            path.parent().unwrap_or(Path::new(".")),
            path.file_name().unwrap_or(std::ffi::OsStr::new("tagdoc.log")),
        );
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(false)
            .with_filter(EnvFilter::new(directive))
    });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new(directive));

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The config is read before logging exists so its level can apply.
    let config = Config::load(&args.config);
    let level = match (&config, args.verbose) {
        (_, true) => LogLevel::Debug,
        (Ok(config), false) => config.logging.level,
        (Err(_), false) => LogLevel::Info,
    };
    init_logging(level, args.log_file.as_deref());

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        },
    };

    info!("tagdoc v{}", env!("CARGO_PKG_VERSION"));
    match tagdoc::run(&config, ClangProvider::discover(args.clang)) {
        Ok(summary) => {
            for path in &summary.written {
                info!("Output: {}", path.display());
            }
            ExitCode::SUCCESS
        },
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        },
    }
}
