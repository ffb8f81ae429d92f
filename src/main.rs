use anyhow::Result;
use clap::Parser;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use cradle::{Component, CradleConfig, Intent, Manager, Supervisor};

#[derive(Parser, Debug)]
#[command(name = "cradle")]
#[command(about = "Component lifecycle supervisor demo")]
#[command(version)]
#[command(long_about = "Builds a small manager graph (config, security, data, platform), \
starts it in dependency order, then walks it through stop, fault, cascade, and delayed \
automatic restart so the supervision behavior can be observed from the log output.")]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "cradle.toml",
        help = "Path to TOML configuration file"
    )]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,
}

struct ConfigManager;

impl Manager for ConfigManager {
    fn name(&self) -> &str {
        "config"
    }
}

struct SecurityManager;

impl Manager for SecurityManager {
    fn name(&self) -> &str {
        "security"
    }
}

struct DataManager;

impl Manager for DataManager {
    fn name(&self) -> &str {
        "data"
    }
}

struct PlatformManager;

impl Manager for PlatformManager {
    fn name(&self) -> &str {
        "platform"
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", CradleConfig::default().to_toml()?);
        return Ok(());
    }

    init_logging(&args);

    info!("Starting cradle demo v{}", env!("CARGO_PKG_VERSION"));

    let config = match CradleConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    config.validate()?;

    let restart_delay = config.restart_delay();
    let supervisor = Supervisor::with_config(config);

    // Print every lifecycle notification as it arrives
    let notifications = supervisor.subscribe();
    thread::spawn(move || {
        for event in notifications {
            println!("event: {}", event.description());
        }
    });

    let config_mgr = supervisor.install(ConfigManager)?;
    let security = supervisor.install_with_deps(SecurityManager, &[&config_mgr])?;
    let data = supervisor.install_with_deps(DataManager, &[&config_mgr, &security])?;
    let platform = supervisor.install_with_deps(PlatformManager, &[&data])?;

    info!("Starting components in dependency order");
    for component in [&config_mgr, &security, &data, &platform] {
        let outcome = component.start();
        if outcome.is_failure() {
            error!("Failed to start '{}': {}", component.name(), outcome);
            std::process::exit(1);
        }
    }
    print_states("after startup", &[&config_mgr, &security, &data, &platform]);

    info!("Stopping 'security' with restart intent; dependents cascade down");
    security.stop(Intent::Restart);
    print_states("after stop", &[&config_mgr, &security, &data, &platform]);

    info!("Restarting 'security'; dependents recover automatically");
    security.start();
    // Two cascade levels, each waits its own restart delay
    thread::sleep(restart_delay * 2 + Duration::from_millis(200));
    print_states("after automatic recovery", &[&config_mgr, &security, &data, &platform]);

    info!("Faulting 'config'; everything above it stops");
    config_mgr.fault(Intent::Stop);
    print_states("after fault", &[&config_mgr, &security, &data, &platform]);

    info!("Cradle demo finished");
    Ok(())
}

fn print_states(label: &str, components: &[&Component]) {
    println!("--- {} ---", label);
    for component in components {
        println!(
            "  {:<10} {} (restart pending: {})",
            component.name(),
            component.state(),
            component.restart_pending()
        );
    }
}

fn init_logging(args: &Args) {
    use tracing_subscriber::EnvFilter;

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cradle={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(args.debug)
        .with_thread_ids(args.debug)
        .init();
}
