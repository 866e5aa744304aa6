use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

use app::App;

#[derive(Parser, Debug)]
#[command(name = "sketcher")]
#[command(about = "Generate Mermaid diagrams from a description")]
#[command(version)]
struct Cli {
    /// Directory holding the API key, recent diagrams and config.json
    #[arg(long, env = "SKETCHER_HOME")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a diagram from a description
    Generate {
        /// What the diagram should show
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Do not add the result to the recent diagrams
        #[arg(long)]
        no_history: bool,
    },
    /// Manage the OpenAI API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Browse recent diagrams
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Add a diagram file to the recent diagrams
    Record {
        file: PathBuf,
    },
    /// Print the file name a diagram would be exported under
    ExportName {
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Store a key (must start with "sk-")
    Set { value: String },
    /// Show the stored key, masked
    Show,
    /// Remove the stored key
    Clear,
}

#[derive(Subcommand, Debug)]
enum HistoryAction {
    /// List recent diagrams, newest first
    List,
    /// Print the markup of one diagram
    Show { id: String },
    /// Forget all recent diagrams
    Clear,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_target(debug)
                .with_line_number(debug)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::from_env(cli.data_dir);
    tracing::debug!("Using data directory {}", app.data_dir().display());

    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Generate { prompt, no_history } => {
            app.generate(&prompt.join(" "), !no_history, &mut out).await
        }
        Commands::Key { action } => match action {
            KeyAction::Set { value } => app.set_key(&value, &mut out).await,
            KeyAction::Show => app.show_key(&mut out).await,
            KeyAction::Clear => app.clear_key(&mut out).await,
        },
        Commands::History { action } => match action {
            HistoryAction::List => app.list_history(&mut out).await,
            HistoryAction::Show { id } => app.show_history(&id, &mut out).await,
            HistoryAction::Clear => app.clear_history(&mut out).await,
        },
        Commands::Record { file } => app.record_file(&file, &mut out).await,
        Commands::ExportName { file } => app.export_name(&file, &mut out),
    }
}
