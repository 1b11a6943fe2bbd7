use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use futures::TryStreamExt as _;
use serde::Deserialize;
use tokio::io::AsyncWriteExt as _;
use tracing_subscriber::EnvFilter;

use ugoira::{
    AppState, Classified, FrameDescriptor, HttpFetcher, Limits, Locale, PageIndex, PixivResolver,
    RelayConfig, StopFlag, Unstoppable, WorkId, classify, proxy_still, reconstruct,
    serve_animation_meta,
};

const DEFAULT_LISTEN: &str = "0.0.0.0:5000";

#[derive(Parser, Debug)]
#[command(name = "ugoira-relay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP relay.
    Serve(ServeArgs),
    /// Fetch one work and write it to a file (GIF for animated works).
    Render(RenderArgs),
    /// Rebuild a GIF from a local frame bundle and frame list, without network access.
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct UpstreamArgs {
    /// pixiv session cookie, sent to the metadata API.
    #[arg(long, env = "PIXIV_COOKIE", hide_env_values = true)]
    cookie: String,

    /// User-Agent for outbound requests.
    #[arg(long, default_value = ugoira::DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Timeout for metadata requests and bundle downloads, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Idle read timeout for streamed still images, in seconds.
    #[arg(long, default_value_t = 120)]
    stream_timeout_secs: u64,
}

#[derive(Args, Debug)]
struct LimitArgs {
    /// Most frames accepted in one animation.
    #[arg(long, default_value_t = Limits::default().max_frames)]
    max_frames: usize,

    /// Pixel budget (width x height x frames) for one animation.
    #[arg(long, default_value_t = Limits::default().max_total_pixels)]
    max_total_pixels: u64,

    /// Largest frame bundle downloaded, in bytes.
    #[arg(long, default_value_t = Limits::default().max_bundle_bytes)]
    max_bundle_bytes: u64,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address. Falls back to `0.0.0.0:$PORT`, then 0.0.0.0:5000.
    #[arg(long, env = "UGOIRA_RELAY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Language of HTML pages and error messages (en or zh).
    #[arg(long, default_value = "en")]
    locale: Locale,

    /// Reconstructions allowed to run at once.
    #[arg(long, default_value_t = ugoira::DEFAULT_MAX_CONCURRENT)]
    max_concurrent: usize,

    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Numeric work id.
    #[arg(long)]
    work: String,

    /// Page of a still work (0-based).
    #[arg(long)]
    page: Option<String>,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Frame bundle (zip).
    #[arg(long)]
    zip: PathBuf,

    /// Frame list JSON: `[{"file":..,"delay":..}]` or an object with a `frames` array.
    #[arg(long)]
    frames: PathBuf,

    /// Output GIF path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    limits: LimitArgs,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameList {
    Bare(Vec<FrameDescriptor>),
    Wrapped { frames: Vec<FrameDescriptor> },
}

impl LimitArgs {
    fn to_limits(&self) -> Limits {
        Limits::default()
            .with_max_frames(self.max_frames)
            .with_max_total_pixels(self.max_total_pixels)
            .with_max_bundle_bytes(self.max_bundle_bytes)
    }
}

impl UpstreamArgs {
    fn to_config(&self, limits: Limits) -> RelayConfig {
        RelayConfig::new(self.cookie.clone())
            .with_user_agent(self.user_agent.clone())
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_stream_read_timeout(Duration::from_secs(self.stream_timeout_secs))
            .with_limits(limits)
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => runtime()?.block_on(cmd_serve(args)),
        Command::Render(args) => runtime()?.block_on(cmd_render(args)),
        Command::Convert(args) => cmd_convert(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")
}

fn listen_addr(explicit: Option<SocketAddr>) -> anyhow::Result<SocketAddr> {
    if let Some(addr) = explicit {
        return Ok(addr);
    }
    let addr = match std::env::var("PORT") {
        Ok(port) => format!("0.0.0.0:{}", port.trim()),
        Err(_) => DEFAULT_LISTEN.to_owned(),
    };
    addr.parse()
        .with_context(|| format!("invalid listen address '{addr}'"))
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let cfg = args.upstream.to_config(args.limits.to_limits());
    tracing::debug!(config = ?cfg, "relay configuration");

    let resolver = Arc::new(PixivResolver::new(&cfg)?);
    let fetcher = Arc::new(HttpFetcher::new(&cfg)?);
    let state = AppState::from_config(resolver, fetcher, &cfg)
        .with_locale(args.locale)
        .with_max_concurrent(args.max_concurrent);

    let addr = listen_addr(args.listen)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, locale = %args.locale, "ugoira-relay listening");

    axum::serve(listener, ugoira::router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutting down");
        })
        .await
        .context("serve")
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let work = WorkId::parse(&args.work)?;
    let page = PageIndex::parse(args.page.as_deref())?;
    let cfg = args.upstream.to_config(args.limits.to_limits());

    let resolver = PixivResolver::new(&cfg)?;
    let fetcher = HttpFetcher::new(&cfg)?;

    match classify(&resolver, &work).await? {
        Classified::Animated(meta) => {
            let gif =
                serve_animation_meta(&fetcher, &work, meta, &cfg.limits, StopFlag::new()).await?;
            tokio::fs::write(&args.out, &gif.bytes)
                .await
                .with_context(|| format!("write '{}'", args.out.display()))?;
            println!(
                "{}: {} frames, {}x{}, {} bytes",
                args.out.display(),
                gif.frame_count,
                gif.width,
                gif.height,
                gif.bytes.len()
            );
        }
        Classified::Static { pages, probe } => {
            tracing::debug!(probe = probe.label(), pages = pages.len(), "still work");
            let url = page.select(&pages)?;
            let image = proxy_still(&fetcher, url, &work, cfg.chunk_size).await?;
            let mut out = tokio::fs::File::create(&args.out)
                .await
                .with_context(|| format!("create '{}'", args.out.display()))?;
            let mut body = image.body;
            let mut written = 0u64;
            while let Some(chunk) = body.try_next().await? {
                out.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            out.flush().await?;
            println!(
                "{}: {} ({written} bytes)",
                args.out.display(),
                image.content_type
            );
        }
    }
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let limits = args.limits.to_limits();
    let frames = read_frame_list(&args.frames)?;
    limits.check_frame_count(frames.len())?;

    let bundle =
        std::fs::read(&args.zip).with_context(|| format!("read '{}'", args.zip.display()))?;
    let gif = reconstruct(&bundle, &frames, &limits, &Unstoppable)?;
    std::fs::write(&args.out, &gif.bytes)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!(
        "{}: {} frames, {}x{}, {} bytes",
        args.out.display(),
        gif.frame_count,
        gif.width,
        gif.height,
        gif.bytes.len()
    );
    Ok(())
}

fn read_frame_list(path: &Path) -> anyhow::Result<Vec<FrameDescriptor>> {
    let raw = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    let list: FrameList = serde_json::from_slice(&raw)
        .with_context(|| format!("parse frame list '{}'", path.display()))?;
    Ok(match list {
        FrameList::Bare(frames) | FrameList::Wrapped { frames } => frames,
    })
}
