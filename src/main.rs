use anyhow::{Context, Result};
use clap::Parser;
use poster_maker::api::{create_router, AppState};
use poster_maker::config::Config;
use poster_maker::service::PosterService;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "poster-maker")]
#[command(about = "Serve the AI poster maker API")]
struct CliArgs {
    /// Address to bind, overrides HOST.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides PORT.
    #[arg(long)]
    port: Option<u16>,

    /// Directory for generated posters, overrides OUTPUT_FOLDER.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
}

impl CliArgs {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poster_maker=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    args.apply(&mut config);

    let service = PosterService::from_config(&config).context("Failed to initialize service")?;
    let app = create_router(AppState::new(service));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Poster maker listening on {}", addr);
    info!("Posters are stored in {}", config.output_dir.display());

    axum::serve(listener, app).await?;
    Ok(())
}
