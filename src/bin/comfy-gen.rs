//! CLI for queueing a text-to-video workflow on a ComfyUI server.

use clap::Parser;
use mediagen::video::{DEFAULT_MODEL, DEFAULT_SIZE};
use mediagen::{CompletedJob, ComfyClient, GenError, TextToVideoRequest, Workflow};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const DEFAULT_PROMPT: &str = "Minimalist game studio logo splash, 16:9 at 480p. The entire frame is solid black. In the center, a wide, single-line logo with the word BadMadBrax is shown. Directly beneath it, a thin rectangular outline with the same width acts like an underline and contains the smaller, squat and slightly elongated word GAMES. Both are centered and fill most of the horizontal space. All letters are solid neon colors in vibrant cyan and molten pink, with some letter edges and curves shaped like circular saw blades. There are no extra visible shapes such as triangles or squares inside the letters. The logo gently pulses in brightness and slightly scales in and out in time with a quiet, distant EDM beat, moving smoothly. The camera stays almost perfectly still, with only tiny micro-movements.";

#[derive(Parser)]
#[command(name = "comfy-gen")]
#[command(about = "Queue a text-to-video workflow on a ComfyUI server and wait for the result")]
#[command(version)]
struct Cli {
    /// ComfyUI server address (default: $COMFYUI_URL or http://127.0.0.1:8000)
    #[arg(long)]
    server: Option<String>,

    /// The text prompt describing the video
    #[arg(short, long, default_value = DEFAULT_PROMPT, hide_default_value = true)]
    prompt: String,

    /// Generator model
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Size label passed to the generator
    #[arg(long, default_value = DEFAULT_SIZE)]
    size: String,

    /// Video duration in seconds
    #[arg(short, long, default_value_t = 5)]
    duration: u32,

    /// Seed for deterministic generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Send the prompt as-is instead of letting the server extend it
    #[arg(long)]
    no_prompt_extend: bool,

    /// Filename prefix for the saved video on the server
    #[arg(long, default_value = "splash_gen")]
    filename_prefix: String,

    /// Container format
    #[arg(long, default_value = "mp4")]
    format: String,

    /// Video codec
    #[arg(long, default_value = "h264")]
    codec: String,

    /// Queue this API-format workflow file instead of the built-in pipeline
    #[arg(short, long, conflicts_with = "prompt")]
    workflow: Option<PathBuf>,

    /// Seconds between history polls
    #[arg(long, default_value_t = 5.0)]
    poll_interval: f64,

    /// Give up after this many seconds (default: wait indefinitely)
    #[arg(long)]
    timeout: Option<f64>,

    /// Download the produced files into this directory
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn seconds(name: &str, secs: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| anyhow::anyhow!("--{name} must be a positive number of seconds"))
}

fn build_workflow(cli: &Cli) -> mediagen::Result<Workflow> {
    if let Some(ref path) = cli.workflow {
        return Workflow::from_path(path);
    }

    let request = TextToVideoRequest::new(&cli.prompt)
        .with_model(&cli.model)
        .with_size(&cli.size)
        .with_duration(cli.duration)
        .with_seed(cli.seed)
        .with_prompt_extend(!cli.no_prompt_extend)
        .with_filename_prefix(&cli.filename_prefix)
        .with_format(&cli.format)
        .with_codec(&cli.codec);
    Ok(Workflow::text_to_video(&request))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut builder =
        ComfyClient::builder().poll_interval(seconds("poll-interval", cli.poll_interval)?);
    if let Some(ref server) = cli.server {
        builder = builder.base_url(server);
    }
    if let Some(timeout) = cli.timeout {
        builder = builder.timeout(seconds("timeout", timeout)?);
    }
    let client = builder.build()?;
    let workflow = build_workflow(&cli)?;
    let start = Instant::now();

    if !cli.json {
        println!("Queuing generation...");
    }
    let prompt_id = client.submit(&workflow).await?;
    if !cli.json {
        println!("Prompt queued! ID: {prompt_id}");
        println!("Waiting for completion (this may take a few minutes)...");
    }

    let entry = client
        .poll_until_ready_or_cancelled(&prompt_id, interrupted())
        .await
        .map_err(|e| match e {
            GenError::Cancelled => anyhow::anyhow!(
                "interrupted while waiting; job {prompt_id} is still queued on the server"
            ),
            other => other.into(),
        })?;

    let job = CompletedJob {
        artifacts: entry.artifacts()?,
        prompt_id,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    let mut downloaded = Vec::new();
    if let Some(ref dir) = cli.download_dir {
        std::fs::create_dir_all(dir)?;
        for artifact in &job.artifacts {
            let data = client.fetch_artifact(artifact).await?;
            downloaded.push(artifact.save(&data, dir)?);
        }
    }

    if cli.json {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "server": client.base_url(),
            "prompt_id": job.prompt_id,
            "artifacts": job.artifacts,
            "downloaded": downloaded.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "duration_ms": job.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Generation complete!");
        for artifact in &job.artifacts {
            println!("{} saved as: {}", artifact.label(), artifact.filename);
        }
        for path in &downloaded {
            println!("Downloaded: {}", path.display());
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the signal handler can't be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
