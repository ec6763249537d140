//! The `caption run` command: upload images and generate captions.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use caption_core::upload::declared_content_type;
use caption_core::{
    AccessTokenProvider, CaptionPipeline, Config, HttpCaptionApi, OutputFormat as CoreOutputFormat,
    ReportWriter, RunReport, StaticToken, TokenFile, UploadCandidate,
};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array of run reports
    Json,
    /// One JSON run report per line, written as each run finishes
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Image files to caption (processed one after another)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Declared content type for every input (default: inferred from extension)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Session access token (default: the [auth] section of the config)
    #[arg(long)]
    pub token: Option<String>,

    /// File holding the session access token, re-read before every run
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// Pipeline API base URL
    #[arg(long, env = "CAPTION_API_URL")]
    pub api_url: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (default: output.format from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print the JSON array
    #[arg(long)]
    pub pretty: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Execute the run command.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let base_url = args
        .api_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());
    tracing::debug!("Using pipeline API at {base_url}");

    let pipeline = CaptionPipeline::new(
        Arc::new(HttpCaptionApi::new(&base_url)),
        token_provider(&args, &config),
    );

    let format = resolve_format(args.format, &config);
    let pretty = args.pretty || config.output.pretty;
    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(expand(path))?)),
        None => Box::new(io::stdout()),
    };
    let mut writer = ReportWriter::new(sink, format, pretty);

    let progress = (!args.no_progress && io::stderr().is_terminal()).then(create_spinner);
    let watcher = progress.clone().map(|pb| {
        let mut rx = pipeline.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let label = rx.borrow_and_update().state.label();
                pb.set_message(label);
            }
        })
    });

    for path in &args.inputs {
        let name = path.display().to_string();
        if let Some(pb) = &progress {
            pb.set_prefix(name.clone());
        }

        let candidate = match UploadCandidate::from_path(path, args.content_type.as_deref()).await
        {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::error!("Failed to read {name}: {e}");
                let declared = declared_content_type(path, args.content_type.as_deref());
                writer.push(RunReport::failed(name, declared, format!("Failed to read file: {e}")))?;
                continue;
            }
        };

        if let Ok(captions) = pipeline.run(&candidate).await {
            for caption in &captions {
                tracing::info!("  {}", caption.display_text());
            }
        }
        writer.push(RunReport::from_snapshot(&candidate, &pipeline.snapshot()))?;
    }

    if let Some(handle) = watcher {
        handle.abort();
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let (succeeded, failed) = writer.finish()?;
    tracing::info!("Captioned {succeeded} image(s), {failed} failed");
    if failed > 0 {
        anyhow::bail!("{failed} of {} run(s) failed", succeeded + failed);
    }
    Ok(())
}

/// `--token-file` wins over `--token`, which wins over the config.
fn token_provider(args: &RunArgs, config: &Config) -> Arc<dyn AccessTokenProvider> {
    if let Some(path) = &args.token_file {
        return Arc::new(TokenFile::new(path));
    }
    if let Some(token) = &args.token {
        return Arc::new(StaticToken::new(token.clone()));
    }
    config.token_provider()
}

fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> CoreOutputFormat {
    flag.map(Into::into)
        .or_else(|| CoreOutputFormat::parse(&config.output.format))
        .unwrap_or(CoreOutputFormat::Json)
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
