use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use craftrec::{
    parse_recommendation_types, BatchRecommendationRequest, ContextOrigin, CulturalAnalyzer,
    CulturalContext, EngineConfig, Error, InMemoryCatalog, ItemRecommendationRequest,
    OrchestratorBuilder, RecommendationResponse, RecommendationType, SeasonalRequest, TtlCache,
    UserPreferenceRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Cultural recommendations for handcrafted items
#[derive(Parser, Debug)]
#[command(name = "craftrec")]
#[command(about = "Content-based recommendations for handcrafted items", long_about = None)]
struct Args {
    /// Catalog snapshot (JSON)
    #[arg(short, long, default_value = "./data/catalog.json")]
    catalog: PathBuf,

    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Do not write resolved cultural contexts back to the catalog
    #[arg(long)]
    read_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommendations for a source item
    Item(TypedRequestArgs),
    /// Recommendations from user preferences and history
    User(RequestArgs),
    /// Festival and seasonal recommendations
    Seasonal(RequestArgs),
    /// Recommendations for several source items
    Batch(TypedRequestArgs),
    /// Catalog summary
    Stats,
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    /// JSON request file; read from stdin when omitted
    #[arg(short, long)]
    request: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct TypedRequestArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Comma-separated recommendation types, replacing those in the request
    #[arg(short, long)]
    types: Option<String>,
}

impl TypedRequestArgs {
    fn types(&self) -> anyhow::Result<Option<Vec<RecommendationType>>> {
        self.types
            .as_deref()
            .map(parse_recommendation_types)
            .transpose()
            .context("parsing --types")
    }
}

/// Analyzer used when no text model is configured; every context comes from keywords
struct NoModel;

#[async_trait]
impl CulturalAnalyzer for NoModel {
    async fn analyze(&self, _title: &str, _description: &str) -> craftrec::Result<CulturalContext> {
        Err(Error::Upstream("no text model configured".to_string()))
    }
}

#[derive(Serialize)]
struct CatalogSummary {
    items: usize,
    parsed: usize,
    heuristic: usize,
    default: usize,
    without_context: usize,
    without_vector: usize,
}

fn read_request<T: DeserializeOwned>(args: &RequestArgs) -> anyhow::Result<T> {
    let raw = match &args.request {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("parsing request")
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_catalog(path: &Path) -> anyhow::Result<InMemoryCatalog> {
    if path.exists() {
        InMemoryCatalog::load_snapshot(path)
    } else {
        info!("Catalog {:?} not found, starting empty", path);
        Ok(InMemoryCatalog::new())
    }
}

fn summarize(catalog: &InMemoryCatalog) -> CatalogSummary {
    let mut summary = CatalogSummary {
        items: 0,
        parsed: 0,
        heuristic: 0,
        default: 0,
        without_context: 0,
        without_vector: 0,
    };
    for record in catalog.records() {
        summary.items += 1;
        if record.vector.is_none() {
            summary.without_vector += 1;
        }
        match (&record.cultural_context, record.context_origin) {
            (None, _) => summary.without_context += 1,
            (Some(_), ContextOrigin::Parsed) => summary.parsed += 1,
            (Some(_), ContextOrigin::Heuristic) => summary.heuristic += 1,
            (Some(_), ContextOrigin::Default) => summary.default += 1,
        }
    }
    summary
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting craftrec v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    // No text model is wired into the CLI
    config.analysis_budget = 0;

    let catalog = Arc::new(load_catalog(&args.catalog)?);
    info!("Catalog {:?} loaded with {} items", args.catalog, catalog.len());

    let engine = OrchestratorBuilder::new(
        catalog.clone(),
        catalog.clone(),
        Arc::new(NoModel),
        Arc::new(TtlCache::<RecommendationResponse>::new()),
    )
    .config(config)
    .build()?;

    match &args.command {
        Command::Item(req) => {
            let mut request: ItemRecommendationRequest = read_request(&req.request)?;
            if let Some(types) = req.types()? {
                request.recommendation_types = types;
            }
            print_json(&engine.recommend_for_item(&request).await?)?;
        }
        Command::User(req) => {
            let request: UserPreferenceRequest = read_request(req)?;
            print_json(&engine.recommend_for_user(&request).await?)?;
        }
        Command::Seasonal(req) => {
            let request: SeasonalRequest = read_request(req)?;
            print_json(&engine.recommend_seasonal(&request).await?)?;
        }
        Command::Batch(req) => {
            let mut request: BatchRecommendationRequest = read_request(&req.request)?;
            if let Some(types) = req.types()? {
                request.recommendation_types = types;
            }
            print_json(&engine.recommend_batch(&request).await?)?;
        }
        Command::Stats => return print_json(&summarize(&catalog)),
    }

    let stats = engine.stats();
    info!(
        served = stats.recommendations_served,
        analyses = stats.analyses_performed,
        fallbacks = stats.fallbacks_used,
        avg_ms = stats.avg_response_time_ms,
        "Run finished"
    );

    if !args.read_only {
        let saved = catalog.save_snapshot(&args.catalog)?;
        info!("Saved {} items to {:?}", saved, args.catalog);
    }
    Ok(())
}
