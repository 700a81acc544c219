use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pomofocus_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomofocus", version, about = "Pomofocus timer CLI")]
struct Cli {
    /// Keep all data in memory for this invocation
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// List achievements and their unlock status
    Achievements,
    /// Timer, notification and display settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Export and import stored data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

fn init_logging(config: &Config) {
    let filter = std::env::var("POMOFOCUS_LOG")
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_new(&config.logging.filter).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let ctx = commands::Context::new(config, cli.ephemeral);
    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &ctx),
        Commands::Task { action } => commands::task::run(action, &ctx),
        Commands::Stats { action } => commands::stats::run(action, &ctx),
        Commands::Achievements => commands::achievements::run(&ctx),
        Commands::Settings { action } => commands::settings::run(action, &ctx),
        Commands::Config { action } => commands::config::run(action),
        Commands::Data { action } => commands::data::run(action, &ctx),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomofocus", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
