use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use glm_realtime_sdk::core::media::{FRAME_PATTERN, FrameSampler, concat_wavs, pcm_to_wav, repair};
use glm_realtime_sdk::core::realtime::messages::{
    BetaFields, ChatMode, DEFAULT_MODALITIES, Session,
};
use glm_realtime_sdk::core::vision::process_recording;
use glm_realtime_sdk::{
    Event, EventType, RealtimeClient, SdkConfig, ShutdownOutcome, VisionClient, handler_fn,
};

/// GLM realtime client and media tools
#[derive(Parser, Debug)]
#[command(name = "glm-realtime")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one realtime exchange and print inbound events
    Session {
        /// User text message
        #[arg(short = 't', long = "text")]
        text: String,

        /// Raw H.264 capture sent as sampled video frames
        #[arg(long = "video", value_name = "FILE")]
        video: Option<PathBuf>,

        /// WAV file appended to the input audio buffer
        #[arg(long = "audio", value_name = "FILE")]
        audio: Option<PathBuf>,
    },

    /// Sample JPEG frames from a raw H.264 capture
    Frames {
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: PathBuf,

        #[arg(short = 'o', long = "out-dir", value_name = "DIR")]
        out_dir: PathBuf,
    },

    /// Wrap raw PCM in a WAV container, or concatenate WAV files
    Wav {
        #[arg(long = "rate", default_value_t = 16000)]
        rate: u32,

        #[arg(long = "channels", default_value_t = 1)]
        channels: u16,

        #[arg(long = "bits", default_value_t = 16)]
        bits: u16,

        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: PathBuf,

        /// Raw PCM files, or WAV files to concatenate
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Describe the video frames of a recorded session with the vision model
    Vision {
        /// Newline-delimited JSON recording
        #[arg(short = 'i', long = "input", value_name = "FILE")]
        input: PathBuf,

        #[arg(short = 'p', long = "prompt", default_value = "")]
        prompt: String,

        /// File the response is appended to
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize crypto provider for TLS connections
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SdkConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => SdkConfig::from_env().context("Failed to load config from environment")?,
    };

    match cli.command {
        Commands::Session { text, video, audio } => {
            run_session(&config, &text, video.as_deref(), audio.as_deref()).await
        }
        Commands::Frames { input, out_dir } => run_frames(&config, &input, &out_dir).await,
        Commands::Wav {
            rate,
            channels,
            bits,
            output,
            inputs,
        } => run_wav(rate, channels, bits, &output, &inputs).await,
        Commands::Vision {
            input,
            prompt,
            output,
        } => run_vision(&config, &input, &prompt, output.as_deref()).await,
    }
}

async fn run_session(
    config: &SdkConfig,
    text: &str,
    video: Option<&Path>,
    audio: Option<&Path>,
) -> anyhow::Result<()> {
    let done = Arc::new(Notify::new());
    let signal = done.clone();

    let handler = handler_fn(move |event: Event| {
        let signal = signal.clone();
        async move {
            match event.event_type {
                EventType::ResponseTextDelta | EventType::ResponseAudioTranscriptDelta => {
                    if let Some(delta) = &event.delta {
                        print!("{}", delta);
                    }
                }
                EventType::ResponseAudioDelta => {}
                EventType::Error => {
                    if let Some(error) = &event.error {
                        warn!("Server error: {}", error);
                    }
                    signal.notify_one();
                }
                EventType::ResponseDone => {
                    println!();
                    if let Some(usage) = event.response.as_ref().and_then(|r| r.usage.as_ref()) {
                        info!(
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "Response done"
                        );
                    }
                    signal.notify_one();
                }
                other => info!(event_type = %other, "Event"),
            }
            Ok(())
        }
    });

    let client = RealtimeClient::with_handler(config.client_options(), handler);
    client.connect().await?;

    let chat_mode = if video.is_some() {
        ChatMode::VideoPassive
    } else {
        ChatMode::Audio
    };
    client
        .send(Event::session_update(Session {
            modalities: DEFAULT_MODALITIES.to_vec(),
            beta_fields: Some(BetaFields {
                chat_mode: Some(chat_mode),
                fps: video.map(|_| config.video.fps),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .await?;

    if let Some(path) = audio {
        let wav = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        client.send(Event::audio_append(&wav)).await?;
        client.send(Event::audio_commit()).await?;
    }

    if let Some(path) = video {
        let capture = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let frames = client.send_video(Event::video_frame_append(capture)).await?;
        info!(frames, "Sent video");
    }

    client.send(Event::user_text(text)).await?;
    client.send(Event::response_create(None)).await?;

    if tokio::time::timeout(config.wait_timeout, done.notified())
        .await
        .is_err()
    {
        warn!("No response within {:?}", config.wait_timeout);
    }

    client.disconnect().await?;
    if client.wait().await == ShutdownOutcome::TimedOut {
        warn!("Receive loop still running at exit");
    }
    Ok(())
}

async fn run_frames(config: &SdkConfig, input: &Path, out_dir: &Path) -> anyhow::Result<()> {
    let capture = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let stream = repair(&capture, &config.video.parameter_sets);
    let sampler = FrameSampler::new(&config.video.decoder, config.video.quality);
    let frames = sampler.sample(&stream, config.video.fps).await?;

    tokio::fs::create_dir_all(out_dir).await?;
    for (index, frame) in frames.iter().enumerate() {
        // Same naming as the decoder pattern
        let name = FRAME_PATTERN.replace("%04d", &format!("{:04}", index + 1));
        tokio::fs::write(out_dir.join(name), frame).await?;
    }

    println!("Wrote {} frames to {}", frames.len(), out_dir.display());
    Ok(())
}

async fn run_wav(
    rate: u32,
    channels: u16,
    bits: u16,
    output: &Path,
    inputs: &[PathBuf],
) -> anyhow::Result<()> {
    let mut buffers = Vec::with_capacity(inputs.len());
    for path in inputs {
        buffers.push(
            tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }

    let wav = if buffers.iter().all(|b| b.starts_with(b"RIFF")) {
        concat_wavs(&buffers)?
    } else {
        pcm_to_wav(&buffers.concat(), rate, channels, bits)
    };

    tokio::fs::write(output, &wav).await?;
    println!("Wrote {} bytes to {}", wav.len(), output.display());
    Ok(())
}

async fn run_vision(
    config: &SdkConfig,
    input: &Path,
    prompt: &str,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = VisionClient::new(config.vision_config())?;
    let response = process_recording(&client, input, prompt, output).await?;

    println!("{}", response.content().unwrap_or_default());
    info!(
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        total_tokens = response.usage.total_tokens,
        "Vision response"
    );
    Ok(())
}
