use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::run::BuiltinHandler;

#[derive(Parser)]
#[command(
    name = "fnshim",
    about = "Run the function invocation adapter over stdio",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Adapter configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one invocation: read stdin, call a built-in handler, write
    /// one response to stdout. Diagnostics go to stderr.
    Run {
        /// Built-in handler to invoke.
        #[arg(long, value_enum, default_value = "echo")]
        handler: BuiltinHandler,
        /// Stamp responses with an `X-Runtime` header.
        #[arg(long)]
        runtime_header: Option<String>,
    },
    /// Print the effective adapter configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    fnshim::diagnostics::init(&config);

    match cli.command {
        Commands::Run {
            handler,
            runtime_header,
        } => commands::run::run(config, handler, runtime_header),
        Commands::Config => commands::config::show(&config),
    }
}
