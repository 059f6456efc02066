//! CLI for generating a music track from a text prompt via ElevenLabs.

use clap::error::ErrorKind;
use clap::Parser;
use mediagen::{ElevenLabsMusicProvider, GenError, MusicGenerationRequest, MusicProvider};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "generate-music")]
#[command(about = "Generate music from a text prompt with the ElevenLabs API")]
#[command(version)]
struct Cli {
    /// ElevenLabs API key
    #[arg(allow_hyphen_values = true)]
    api_key: String,

    /// The text prompt describing the music
    #[arg(allow_hyphen_values = true)]
    prompt: String,

    /// Output filename without extension; `.mp3` is appended
    #[arg(allow_hyphen_values = true)]
    filename: String,

    /// Desired track length in milliseconds
    #[arg(long)]
    length_ms: Option<u32>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Parses arguments, exiting with status 1 and usage text when they are
/// missing or malformed.
fn parse_args() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let provider = ElevenLabsMusicProvider::builder()
        .api_key(&cli.api_key)
        .build()?;

    let mut request = MusicGenerationRequest::new(&cli.prompt);
    if let Some(ms) = cli.length_ms {
        request = request.with_length_ms(ms);
    }

    if !cli.json {
        println!("Generating music for: {}...", cli.prompt);
    }

    let audio = match provider.generate(&request).await {
        Ok(audio) => audio,
        Err(GenError::Api { status, message }) => {
            eprintln!("Error: {status}");
            eprintln!("{message}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let output = format!("{}.mp3", cli.filename);
    audio.save(&output)?;

    if cli.json {
        let result = serde_json::json!({
            "type": "audio",
            "success": true,
            "output": output,
            "size_bytes": audio.size(),
            "mime_type": audio.mime_type,
            "provider": audio.provider.to_string(),
            "duration_ms": audio.metadata.duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Success! Saved to {output}");
    }

    Ok(())
}
