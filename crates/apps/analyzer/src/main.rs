use app_state::load_app_settings;
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use common_types::PhotoReference;
use gemini_api::GeminiClient;
use google_auth::{SCOPE_CLOUD_PLATFORM, SCOPE_DATASTORE, TokenProvider};
use outfit_analysis::AnalysisPipeline;
use outfit_store::{FirestoreOutfitStore, MemoryOutfitStore, OutfitStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vision_api::VisionClient;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// User whose outfit collection is targeted.
    #[clap(long)]
    user: String,
    /// JSON manifest holding an array of photo references to analyze.
    #[clap(long)]
    manifest: Option<PathBuf>,
    /// OAuth bearer token for fetching files from the remote store.
    #[clap(long)]
    bearer_token: Option<String>,
    /// Print aggregated stats for the user.
    #[clap(long, default_value_t = false, action)]
    stats: bool,
    /// Print personalized recommendations for the user.
    #[clap(long, default_value_t = false, action)]
    recommendations: bool,
    /// Keep records in memory instead of the document store.
    #[clap(long, default_value_t = false, action)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_app_settings()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    color_eyre::install()?;

    let args = Args::parse();
    if args.manifest.is_none() && !args.stats && !args.recommendations {
        bail!("nothing to do: pass --manifest, --stats or --recommendations");
    }

    let credentials = settings.secrets.credentials_file.as_deref();
    let vision_tokens = credentials
        .map(|path| TokenProvider::from_key_file(path, SCOPE_CLOUD_PLATFORM))
        .transpose()
        .wrap_err("cannot load service-account credentials")?
        .map(Arc::new);
    let store_tokens = credentials
        .map(|path| TokenProvider::from_key_file(path, SCOPE_DATASTORE))
        .transpose()?
        .map(Arc::new);

    let vision = VisionClient::builder()
        .maybe_api_key(settings.secrets.vision_api_key.clone())
        .maybe_token_provider(vision_tokens)
        .rest_timeout_secs(settings.analysis.request_timeout_secs)
        .build();
    let gemini = GeminiClient::builder()
        .maybe_api_key(settings.secrets.gemini_api_key.clone())
        .model_candidates(settings.analysis.model_candidates.clone())
        .timeout_secs(settings.analysis.request_timeout_secs)
        .build();

    let store: Arc<dyn OutfitStore> = if args.memory_store || store_tokens.is_none() {
        if !args.memory_store {
            warn!("No credentials configured; falling back to the in-memory store");
        }
        Arc::new(MemoryOutfitStore::new())
    } else {
        Arc::new(
            FirestoreOutfitStore::builder()
                .project_id(&settings.google.project_id)
                .database_id(&settings.google.firestore_database)
                .maybe_token_provider(store_tokens)
                .build(),
        )
    };

    let pipeline = AnalysisPipeline::new(Arc::new(vision), Arc::new(gemini), store);

    if let Some(manifest) = &args.manifest {
        let raw = std::fs::read_to_string(manifest)
            .wrap_err_with(|| format!("cannot read manifest {}", manifest.display()))?;
        let photos: Vec<PhotoReference> =
            serde_json::from_str(&raw).wrap_err("manifest must be a JSON array of photos")?;
        info!("Processing {} photos for user {}", photos.len(), args.user);

        let outcome = pipeline
            .process_batch(&args.user, &photos, args.bearer_token.as_deref())
            .await?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    if args.stats {
        let stats = pipeline.user_stats(&args.user).await?;
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if args.recommendations {
        let recommendations = pipeline.recommendations(&args.user).await?;
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    }

    Ok(())
}
