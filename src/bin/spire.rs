use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use spire_client::app::App;
use spire_client::cache::DataCache;
use spire_client::client::SpireHttpClient;
use spire_client::domain::{AmrMode, DownloadTarget, ItemId, ViewTarget};
use spire_client::error::SpireError;

#[derive(Parser)]
#[command(name = "spire")]
#[command(about = "Interact with the SPIRE microbiome genomics archive")]
#[command(version, author)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "View data from a study or sample")]
    View(ViewArgs),
    #[command(about = "Download data from a study or sample")]
    Download(DownloadArgs),
    #[command(about = "Drop the persisted reference-table cache")]
    ClearCache,
}

#[derive(Args)]
struct ViewArgs {
    #[arg(long = "type", value_enum, default_value_t = ViewTarget::Metadata)]
    target: ViewTarget,

    #[arg(long, value_enum, default_value_t = AmrMode::Deeparg)]
    amr_tool: AmrMode,

    #[arg(value_name = "INPUT", required = true, help = "Study or sample IDs")]
    input: Vec<String>,
}

#[derive(Args)]
struct DownloadArgs {
    #[arg(long = "type", value_enum, default_value_t = DownloadTarget::Metadata)]
    target: DownloadTarget,

    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    #[arg(value_name = "INPUT", required = true, help = "Study or sample IDs")]
    input: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<SpireError>() {
            tracing::error!("{err}");
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &SpireError) -> u8 {
    match error {
        SpireError::InvalidAmrMode(_)
        | SpireError::UnsupportedTarget { .. }
        | SpireError::ManifestUnavailable(_) => 2,
        SpireError::SpireHttp(_) | SpireError::SpireStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = DataCache::new().into_diagnostic()?;

    match cli.command {
        Commands::View(args) => {
            let client = SpireHttpClient::new().into_diagnostic()?;
            let app = App::new(client, cache);
            for input in &args.input {
                let item = ItemId::classify(input);
                let rendered = app.view(&item, args.target, args.amr_tool)?;
                print!("{rendered}");
            }
            Ok(())
        }
        Commands::Download(args) => {
            let client = SpireHttpClient::new().into_diagnostic()?;
            let app = App::new(client, cache);
            for input in &args.input {
                let item = ItemId::classify(input);
                app.download(&item, args.target, &args.output)?;
            }
            Ok(())
        }
        Commands::ClearCache => {
            cache.clear_all().into_diagnostic()?;
            Ok(())
        }
    }
}
