use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    sync::Arc,
};

use clap::Parser;
use tracing_subscriber::{
    EnvFilter, Layer as _, filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt,
    util::SubscriberInitExt as _,
};

use self::{ocr::VisionOcrEngine, prelude::*};

mod annotation;
mod error;
mod extract;
mod ocr;
mod prelude;
mod render;
mod server;

/// Scan photos of food labels for ingredient lists.
#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    after_help = r#"
Environment Variables:
  - GOOGLE_VISION_API_KEY: The Google Cloud Vision API key to use.
  - GOOGLE_VISION_API_BASE (optional): Override the Vision endpoint URL.

  These variables may be set in a standard `.env` file.
"#
)]
struct Opts {
    /// The address to bind.
    #[clap(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// The port to listen on.
    #[clap(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

/// Our entry point, which can return an error. [`anyhow::Result`] will
/// automatically print a nice error message with optional backtrace.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing.
    let directive =
        Directive::from_str("info").expect("built-in directive should be valid");
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt::layer()
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(env_filter);

    // We can stack multiple layers here if we need to.
    tracing_subscriber::registry().with(subscriber).init();

    // Call our real `main` function now that logging is set up.
    real_main().await
}

/// Our real entry point.
#[instrument(level = "debug", name = "main", skip_all)]
async fn real_main() -> Result<()> {
    // Load environment variables from a `.env` file, if it exists. This must
    // happen before argument parsing, because `--port` falls back to `PORT`.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let opts = Opts::parse();
    debug!("Parsed options: {:?}", opts);

    // The OCR client is built once here and injected into the server, so
    // request handlers never reach for a global.
    let engine = Arc::new(VisionOcrEngine::from_env()?);

    let addr = SocketAddr::new(opts.bind, opts.port);
    server::serve(addr, engine).await
}
