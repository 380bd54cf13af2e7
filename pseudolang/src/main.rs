mod commands;
mod interpret;
mod llm;
mod prompt;
mod runner;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use llm_client::{Config, ProviderKind};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "pseudolang",
    about = "A pseudolang interpreter",
    long_about = "Translates pseudocode to Python with an LLM and runs it with the local Python interpreter"
)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a pseudolang file
    Run {
        /// File containing pseudocode
        file: PathBuf,

        /// Print the generated Python code before running it
        #[arg(short, long)]
        verbose: bool,

        /// Run the file as Python directly, without translating it
        #[arg(long)]
        raw: bool,
    },
    /// Execute a pseudolang string
    Exec {
        /// Pseudocode; multiple arguments are joined with spaces
        #[arg(required = true, num_args = 1..)]
        input: Vec<String>,

        /// Print the generated Python code before running it
        #[arg(short, long)]
        verbose: bool,
    },
    /// Switch to a specific model (auto-detects provider)
    Model {
        /// Model name, e.g. gpt-4, claude-3-opus, llama-3-70b
        model: String,

        /// API token for the model's provider
        #[arg(long)]
        token: Option<String>,
    },
    /// Set API token for a provider
    Provider {
        /// Provider (openai, anthropic, groq, ollama, mistral, openrouter, azure-openai)
        provider: String,

        /// API token
        token: String,

        /// Custom endpoint (required for azure-openai)
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration (tokens masked)
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("PSEUDOLANG_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    match run(args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run `command`, aborting it on Ctrl-C.
///
/// Dropping the command future cancels any in-flight request, kills the
/// Python child and removes its temporary script.
async fn run(command: Commands) -> Result<()> {
    tokio::select! {
        result = dispatch(command) => result,
        _ = tokio::signal::ctrl_c() => bail!("interrupted"),
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run { file, verbose, raw } => {
            if raw {
                return interpret::execute_python_file(&file).await;
            }
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read file: {}", file.display()))?;
            interpret::execute_with_llm(&content, verbose).await
        }
        Commands::Exec { input, verbose } => {
            interpret::execute_with_llm(&input.join(" "), verbose).await
        }
        Commands::Model { model, token } => update_config(|config| {
            commands::set_model(config, &model, token.as_deref())
        }),
        Commands::Provider {
            provider,
            token,
            base_url,
        } => {
            let kind: ProviderKind = provider.parse()?;
            update_config(|config| {
                commands::set_provider(config, kind, &token, base_url.as_deref())
            })
        }
        Commands::Config { action } => {
            let path = Config::config_path()?;
            match action {
                ConfigAction::Show => {
                    let config = Config::load_from(&path).context("failed to load config")?;
                    print!("{}", commands::describe_config(&config, &path));
                }
                ConfigAction::Path => println!("{}", path.display()),
            }
            Ok(())
        }
    }
}

/// Load the config, apply `change`, save it and print the resulting message
fn update_config(change: impl FnOnce(&mut Config) -> Result<String>) -> Result<()> {
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path).context("failed to load config")?;

    let message = change(&mut config)?;

    config.save_to(&path).context("failed to save config")?;
    info!("Config written to {}", path.display());
    println!("{}", message);
    Ok(())
}
