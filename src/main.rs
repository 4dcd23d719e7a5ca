use anyhow::Context;
use casebase::{CaseBase, FeatureSchema, RestApi, RetrieverConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Case-based retrieval over tabular records
#[derive(Parser, Debug)]
#[command(name = "casebase")]
#[command(about = "Find similar historical cases and estimate outcomes", long_about = None)]
struct Args {
    /// Path to the JSON corpus (array of rows or object of columns)
    #[arg(short, long)]
    corpus: PathBuf,

    /// Optional JSON schema file; defaults to the car-sales schema
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Categorical attribute the query must match exactly
    #[arg(long, default_value = "Manufacturer")]
    filter_attribute: String,

    /// Disable the hard filter
    #[arg(long, conflicts_with = "filter_attribute")]
    no_filter: bool,

    /// Neighbors returned when a request does not specify k
    #[arg(short, long, default_value_t = 5)]
    k: usize,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the REST API
    Serve {
        /// HTTP API port
        #[arg(long, default_value_t = 6333)]
        http_port: u16,
    },
    /// Run one query given as a JSON object and print the result
    Query {
        /// Query record, e.g. '{"Manufacturer": "Ford", ...}'
        json: String,
    },
}

fn load_schema(path: Option<&Path>) -> anyhow::Result<FeatureSchema> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing schema {}", path.display()))
        }
        None => Ok(FeatureSchema::car_sales()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting casebase v{}", env!("CARGO_PKG_VERSION"));
    info!("Corpus: {:?}", args.corpus);

    let schema = load_schema(args.schema.as_deref())?;
    let config = RetrieverConfig {
        filter_attribute: (!args.no_filter).then(|| args.filter_attribute.clone()),
        default_k: args.k,
    };

    let base: CaseBase = casebase::open(&args.corpus, schema, config)
        .with_context(|| format!("loading corpus {}", args.corpus.display()))?;
    let base = Arc::new(base);

    match args.command {
        Command::Query { json } => {
            let query: casebase::Record = serde_json::from_str(&json).context("query must be a JSON object")?;
            let retrieval = base.retrieve(&query, None)?;
            let response = retrieval.to_response(base.schema());
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Serve { http_port } => serve(base, http_port).await,
    }

    Ok(())
}

async fn serve(base: Arc<CaseBase>, http_port: u16) {
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(base, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
}
