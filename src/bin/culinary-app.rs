use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};

use culinary::app::{AppState, router};
use culinary::auth::PasswordCost;
use culinary::gemini::GeminiClient;
use culinary::genai::{ModelEngine, TextModel};
use culinary::generation::Generator;
use culinary::logging::LogFormat;
use culinary::openai::OpenAiClient;
use culinary::photos::{PhotoSearch, PixabayClient};
use culinary::store::{LocalFsStore, Store};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, env = "CULINARY_ADDR", default_value = "127.0.0.1:5000")]
    addr: SocketAddr,

    /// Document store root.
    #[arg(long, env = "CULINARY_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Uploaded and curated images, served under `/images`.
    #[arg(long, env = "CULINARY_IMAGES_DIR", default_value = "public/images")]
    images_dir: PathBuf,

    #[arg(long, env = "CULINARY_ENGINE", value_enum, default_value_t = ModelEngine::Gemini)]
    engine: ModelEngine,

    #[arg(long, env = "CULINARY_MODEL", default_value = "gemini-2.5-flash")]
    model: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = culinary::gemini::DEFAULT_BASE_URL)]
    gemini_base_url: url::Url,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    openai_base_url: url::Url,

    #[arg(long, env = "PIXABAY_API_KEY", hide_env_values = true)]
    pixabay_api_key: String,

    #[arg(long, env = "PIXABAY_BASE_URL", default_value = culinary::photos::DEFAULT_PIXABAY_URL)]
    pixabay_base_url: url::Url,

    /// Origins allowed by CORS (repeatable). Empty allows any origin.
    #[arg(long = "allowed-origin", env = "CULINARY_ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Vec<String>,

    #[arg(long, env = "CULINARY_SESSION_TTL_DAYS", default_value_t = 7)]
    session_ttl_days: i64,

    /// Timeout for outbound model and photo-search calls.
    #[arg(long, env = "CULINARY_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    request_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = PasswordCost::Standard)]
    password_cost: PasswordCost,

    #[arg(long, env = "CULINARY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let args = AppArgs::parse();
    culinary::logging::init(args.log_format)?;
    tracing::info!(
        addr = %args.addr,
        engine = ?args.engine,
        model = %args.model,
        data_dir = %args.data_dir.display(),
        "starting culinary-app"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.request_timeout_secs))
        .build()
        .context("build http client")?;

    let model: Arc<dyn TextModel> = match args.engine {
        ModelEngine::Gemini => {
            let key = args
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY is required for the gemini engine")?;
            Arc::new(GeminiClient::new(
                http.clone(),
                args.gemini_base_url.as_str(),
                key,
                args.model.clone(),
            ))
        }
        ModelEngine::Openai => {
            let key = args
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY is required for the openai engine")?;
            Arc::new(OpenAiClient::new(
                http.clone(),
                args.openai_base_url.as_str(),
                key,
                args.model.clone(),
            ))
        }
    };
    let photos: Arc<dyn PhotoSearch> = Arc::new(PixabayClient::new(
        http,
        args.pixabay_base_url.as_str(),
        args.pixabay_api_key.clone(),
    ));
    let store: Arc<dyn Store> = Arc::new(LocalFsStore::new(&args.data_dir));

    let state = AppState {
        generator: Generator::new(model, photos, Arc::clone(&store)),
        store,
        images_dir: args.images_dir.clone(),
        session_ttl: chrono::Duration::days(args.session_ttl_days),
        password_cost: args.password_cost,
    };

    let app = router(state).layer(cors_layer(&args.allowed_origins)?);

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid origin: {o}")))
        .collect::<anyhow::Result<_>>()?;

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
