//! Interaction recorder CLI
//!
//! Opens a URL in Chromium, injects the recorder and prints every recorded
//! action as one JSON line on stdout until interrupted.

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

/// Record clicks and input changes on a web page
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "rk-record")]
#[command(version)]
#[command(about = "Record user interactions on a web page as JSON lines")]
struct Args {
    /// URL to open and record on
    #[arg(short, long)]
    url: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Run without a visible window
    #[arg(long)]
    headless: bool,

    /// Disable the Chrome sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Name of the page-global binding the recorder reports through
    #[arg(long, default_value = interaction_recorder::recorder::DEFAULT_BINDING)]
    binding: String,
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use interaction_recorder::browser::{
        BrowserConfig, BrowserController, PageNavigator, RecorderConfig, RecordingSession,
        UrlValidator,
    };
    use interaction_recorder::recorder::JsonLinesSink;

    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };

    // stdout carries the recorded actions
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    UrlValidator::validate(&args.url).context("Please enter a valid URL first")?;

    let mut config = BrowserConfig::builder()
        .headless(args.headless)
        .sandbox(!args.no_sandbox);
    if let Some(path) = args.chrome_path {
        config = config.chrome_path(path);
    }

    let controller = BrowserController::launch(config.build())
        .await
        .context("Failed to launch browser")?;
    let page = controller.new_page().await?;
    PageNavigator::goto(&page, &args.url, None).await?;

    let session = RecordingSession::start(
        &page,
        RecorderConfig::default().with_binding(args.binding),
        JsonLinesSink::stdout(),
    )
    .await
    .context("Failed to start recording")?;

    tracing::info!("Recording on {}. Press Ctrl+C to stop.", args.url);
    tokio::signal::ctrl_c().await?;

    let count = session.stop().await?;
    tracing::info!("Recorded {} actions", count);

    controller.close().await?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {}
