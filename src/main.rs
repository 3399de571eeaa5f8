//! Signcam binary.
//!
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use env_logger::TimestampPrecision;
use reqwest::Client;
use signcam::{
    display::{ConsoleDisplay, DEFAULT_FINALIZE_THRESHOLD},
    hosted::{url_exists, HostedUrls},
    nn::SignClassifier,
    pipeline::Pipeline,
    region::RegionSelection,
    sensors::FrameSource,
};

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// URL of the serialized ONNX model
    #[clap(long)]
    model_url: String,

    /// URL of the metadata document next to the model
    #[clap(long)]
    metadata_url: String,

    /// Video device to capture from
    #[clap(long, default_value = "/dev/video0")]
    device: String,

    /// Capture resolution as WIDTHxHEIGHT, highest supported if omitted
    #[clap(long, value_parser = parse_resolution)]
    resolution: Option<(u32, u32)>,

    /// Horizontal crop position in percent
    #[clap(long, default_value_t = 50.0)]
    x: f32,

    /// Vertical crop position in percent
    #[clap(long, default_value_t = 50.0)]
    y: f32,

    /// Milliseconds between inference ticks
    #[clap(long, default_value_t = 1000)]
    period_ms: u64,

    /// Confidence the top prediction must exceed to finalize a letter
    #[clap(long, default_value_t = DEFAULT_FINALIZE_THRESHOLD)]
    finalize_threshold: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let args = Args::parse();
    let region = RegionSelection::new(args.x, args.y)?;
    let urls = HostedUrls {
        model: args.model_url,
        metadata: args.metadata_url,
    };

    let client = Client::new();
    if !url_exists(&client, &urls.model).await {
        bail!("model not available at {}", urls.model);
    }
    log::info!("Model available: {}", urls.model);

    let classifier = SignClassifier::init(&client, &urls).await?;
    let source = FrameSource::open(&args.device, args.resolution)?;
    let display = ConsoleDisplay::new(args.finalize_threshold);

    Pipeline::new(
        source,
        region,
        classifier,
        display,
        Duration::from_millis(args.period_ms),
    )
    .run()
    .await
}

fn parse_resolution(raw: &str) -> Result<(u32, u32), String> {
    match raw.split_once('x') {
        Some((w, h)) => match (w.parse(), h.parse()) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(format!("invalid resolution {raw}")),
        },
        None => Err(format!("expected WIDTHxHEIGHT, got {raw}")),
    }
}
