use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use imagist::auth::{CredentialSource, EnvCredentials};
use imagist::banner::{BannerInfo, print_banner};
use imagist::config::{Settings, bind_addr, load_dotenv};
use imagist::consts::{DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_QUALITY, DEFAULT_SIZE};
use imagist::engine::collage::CollageEngine;
use imagist::engine::{Engine, Submission};
use imagist::history::{HistoryScope, HistoryStore};
use imagist::painter::ImageParams;
use imagist::painter::openai::OpenAiPainter;
use imagist::server::{self, AppState};

/// Session key used for prompts given with `--run`.
const CLI_SESSION: &str = "cli";

#[derive(Parser)]
#[command(name = "imagist", version, about = "One more word, one more image.")]
struct Cli {
    /// Address to bind the web GUI to
    #[arg(long, env = "IMAGIST_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port for the web GUI
    #[arg(short, long, env = "IMAGIST_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Operator override for the image model sent with every request
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Operator override for the image size; must be one the model accepts
    #[arg(long, default_value = DEFAULT_SIZE)]
    size: String,

    /// Operator override for the quality tier; must be one the model accepts
    #[arg(long, default_value = DEFAULT_QUALITY)]
    quality: String,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    api_base: Option<String>,

    /// Per-request timeout in seconds (default: wait indefinitely)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Paint the combined prompt only after the new prompt's image is done
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Give each browser tab its own prompt history
    #[arg(long, default_value_t = false)]
    per_session: bool,

    /// Submit these prompts in order and exit (repeatable, skips the GUI)
    #[arg(short, long)]
    run: Vec<String>,

    /// Where `--run` writes its images
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings {
            addr: bind_addr(&self.host, self.port)?,
            params: ImageParams {
                model: self.model.clone(),
                size: self.size.clone(),
                quality: self.quality.clone(),
            },
            api_base: self.api_base.clone(),
            timeout: self.timeout.map(Duration::from_secs),
            sequential: self.sequential,
            scope: if self.per_session {
                HistoryScope::PerSession
            } else {
                HistoryScope::Shared
            },
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before parsing, so clap's env fallbacks see .env values
    let dotenv = load_dotenv();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("imagist=info,tower_http=info")),
        )
        .init();

    for err in &dotenv.errors {
        tracing::warn!(error = %format!("{err:#}"), "skipped .env file");
    }
    if let Some(path) = &dotenv.loaded {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let cli = Cli::parse();
    let settings = cli.settings()?;

    let credentials = EnvCredentials::default();
    let auth_status = credentials.status();
    if credentials.resolve().is_err() {
        tracing::warn!(
            var = credentials.var(),
            "no API key yet; submissions will fail until it is set"
        );
    }

    let painter = Arc::new(OpenAiPainter::new(settings.api_base.clone(), settings.timeout)?);
    let history = Arc::new(HistoryStore::new(settings.scope));
    let engine: Arc<dyn Engine> = Arc::new(CollageEngine::new(
        painter,
        Box::new(credentials),
        history,
        settings.collage_config(),
    ));

    let url = format!("http://{}", settings.addr);
    print_banner(&BannerInfo {
        model: &settings.params.model,
        size: &settings.params.size,
        quality: &settings.params.quality,
        auth_status: &auth_status,
        history: settings.scope_label(),
        ordering: settings.ordering_label(),
        url: cli.run.is_empty().then_some(url.as_str()),
    });

    // One-shot mode
    if !cli.run.is_empty() {
        return run_prompts(engine.as_ref(), &cli.run, &cli.out_dir).await;
    }

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.addr))?;

    server::run(
        listener,
        AppState {
            engine,
            model: settings.params.model.clone(),
            history_scope: settings.scope_label(),
        },
    )
    .await
}

/// Submit each prompt in order, writing both images per prompt.
/// A failed prompt is reported and the next one still runs.
async fn run_prompts(
    engine: &dyn Engine,
    prompts: &[String],
    out_dir: &Path,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for text in prompts {
        match engine.submit(CLI_SESSION, text).await {
            Ok(submission) => {
                println!("\n=> {}", submission.caption);
                for path in save_images(&submission, out_dir).await? {
                    println!("   {}", path.display());
                }
            }
            Err(e) => eprintln!("\nerror: {}", e),
        }
    }
    Ok(())
}

async fn save_images(submission: &Submission, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let n = submission.ordinal;
    let files = [
        (
            format!("prompt_{n}.{}", submission.prompt_image.format.extension()),
            &submission.prompt_image.bytes,
        ),
        (
            format!("prompt_{n}_combined.{}", submission.combined_image.format.extension()),
            &submission.combined_image.bytes,
        ),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, bytes) in files {
        let path = out_dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
