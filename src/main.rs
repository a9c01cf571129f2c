//! dev-random CLI
//!
//! Writes cryptographically strong random bytes to a file or stdout,
//! in the manner of reading from `/dev/random`.

use clap::{Args, Parser, Subcommand};
use dev_random::{
    analysis::{QualityThresholds, SampleStatistics},
    derive_host_seed, Backend, DeviceConfig, EntropyDevice, HashAlgorithm,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

/// Exit code used when interrupted by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Parser)]
#[command(name = "dev-random", version, about = "Emulates a Unix entropy device")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Restrict the enabled backends (hardware, software, os). Repeatable.
    #[arg(short, long = "backend", global = true)]
    backends: Vec<Backend>,

    /// Digest algorithm for seed derivation (SHA-256, SHA-512, BLAKE3).
    #[arg(short, long, global = true)]
    algorithm: Option<HashAlgorithm>,

    /// Serve Prometheus metrics on this port while writing (0 disables).
    /// Requires the `metrics` feature.
    #[arg(long, global = true)]
    metrics_port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write random bytes (the default).
    Write(WriteArgs),
    /// Print a seed derived from system observations.
    Seed,
    /// Generate a sample in memory and run statistical sanity checks.
    Check(CheckArgs),
}

#[derive(Debug, Default, Args)]
struct WriteArgs {
    /// Output path; `-` for stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bytes to write; negative for unbounded.
    #[arg(short, long, allow_negative_numbers = true)]
    size: Option<i64>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Sample size in bytes.
    #[arg(short = 'n', long, default_value_t = 1024 * 1024)]
    bytes: usize,

    /// Use the conservative thresholds.
    #[arg(long)]
    conservative: bool,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout can carry random bytes.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Some(Command::Seed) => run_seed(config),
        Some(Command::Check(args)) => run_check(config, &args),
        Some(Command::Write(args)) => run_write(config, args),
        None => run_write(config, WriteArgs::default()),
    }
}

fn load_config(cli: &Cli) -> Result<DeviceConfig, dev_random::config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => DeviceConfig::from_file(path)?,
        None => DeviceConfig::default(),
    };

    if !cli.backends.is_empty() {
        config.source.backends = cli.backends.clone();
        config.source.backends.sort();
        config.source.backends.dedup();
    }
    if let Some(algorithm) = cli.algorithm {
        config.seed.algorithm = algorithm.id().to_string();
    }
    if let Some(port) = cli.metrics_port {
        config.output.metrics_port = port;
    }

    config.validate()?;
    Ok(config)
}

fn run_write(mut config: DeviceConfig, args: WriteArgs) -> ExitCode {
    if let Some(output) = args.output {
        config.output.path = output;
    }
    if let Some(size) = args.size {
        config.output.size = size;
    }

    let path = config.output.path.clone();
    let size = config.output.size;

    let mut device = match EntropyDevice::initialize(config) {
        Ok(device) => device,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stats = device.stats();
    if let Err(e) = ctrlc::set_handler(move || {
        info!(bytes_written = stats.bytes_written(), "Interrupted");
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    #[cfg(feature = "metrics")]
    spawn_metrics_server(&device);

    match device.write(&path, size) {
        Ok(written) => {
            info!(written, path = %path.display(), "Done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_seed(config: DeviceConfig) -> ExitCode {
    match derive_host_seed(&config.seed.algorithm) {
        Ok(seed) => {
            println!("{}", seed.to_hex());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(kind = ?e.kind(), "{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_check(config: DeviceConfig, args: &CheckArgs) -> ExitCode {
    let mut device = match EntropyDevice::initialize(config) {
        Ok(device) => device,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut sample = Vec::with_capacity(args.bytes);
    if let Err(e) = device.write_to(&mut sample, args.bytes as i64) {
        error!("{}", e);
        return ExitCode::FAILURE;
    }

    let stats = SampleStatistics::analyze(&sample);
    println!("backend:         {}", device.backend().map(|b| b.name()).unwrap_or("none"));
    println!("seeded:          {}", device.is_seeded());
    println!("sample size:     {} bytes", stats.sample_size);
    println!("bit bias:        {:+.5}", stats.bit_bias);
    println!("variance:        {:.2}", stats.variance);
    println!("autocorrelation: {:+.5}", stats.autocorrelation);
    println!("chi-square:      {:.2} (255 dof)", stats.chi_square);

    let thresholds = if args.conservative {
        QualityThresholds::conservative()
    } else {
        QualityThresholds::default()
    };

    match thresholds.check(&stats) {
        Ok(()) => {
            println!("result:          pass");
            ExitCode::SUCCESS
        }
        Err(violation) => {
            println!("result:          FAIL ({})", violation);
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(device: &EntropyDevice) {
    use dev_random::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

    let port = device.config().output.metrics_port;
    if port == 0 {
        return;
    }

    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            return;
        }
    };
    let server = MetricsServer::new(
        MetricsServerConfig::with_port(port),
        registry,
        device.stats(),
        device.backend(),
        device.is_seeded(),
    );

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Metrics runtime failed to start: {}", e);
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!("Metrics server stopped: {}", e);
        }
    });
}
