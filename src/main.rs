use clap::{Parser, Subcommand};
use downsize::config;
use downsize::convert::{Converter, JobEvent};
use downsize::options::{ConversionOptions, PostOp, Watermark};
use downsize::output;
use downsize::video::{EngineError, FfmpegEngine};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

/// Source and target plus every per-job option.
#[derive(clap::Args, Clone)]
struct JobArgs {
    /// File to read
    source: PathBuf,

    /// File to write (parent directories are created)
    target: PathBuf,

    /// Maximum width, or crop width when combined with --height
    #[arg(long)]
    width: Option<u32>,

    /// Maximum height, or crop height when combined with --width
    #[arg(long)]
    height: Option<u32>,

    /// Compression quality, 0-100
    #[arg(long)]
    quality: Option<u32>,

    /// Output format, overriding the target extension
    #[arg(long)]
    format: Option<String>,

    /// Video bitrate, e.g. 800k
    #[arg(long)]
    bitrate: Option<String>,

    /// Keep every frame of an animated GIF
    #[arg(long)]
    animated: bool,

    /// Image composited onto the output
    #[arg(long, value_name = "FILE")]
    watermark: Option<PathBuf>,

    /// Watermark placement: NorthWest, North, ... SouthEast, or Repeat to tile
    #[arg(long, value_name = "NAME", requires = "watermark")]
    watermark_position: Option<String>,

    /// Post-processing step, e.g. sharpen, blur=2, rotate=90 (repeatable)
    #[arg(long = "arg", value_name = "OP")]
    post: Vec<PostOp>,

    /// Full option record as JSON; explicit flags override its fields
    #[arg(long, value_name = "JSON")]
    options: Option<String>,
}

impl JobArgs {
    fn conversion_options(&self) -> Result<ConversionOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.options {
            Some(json) => ConversionOptions::from_json(json)?,
            None => ConversionOptions::default(),
        };
        if self.width.is_some() {
            options.width = self.width;
        }
        if self.height.is_some() {
            options.height = self.height;
        }
        if self.quality.is_some() {
            options.quality = self.quality;
        }
        if self.format.is_some() {
            options.format = self.format.clone();
        }
        if self.bitrate.is_some() {
            options.bitrate = self.bitrate.clone();
        }
        if self.animated {
            options.animated = true;
        }
        if let Some(file) = &self.watermark {
            options.watermark = Some(Watermark {
                file: file.clone(),
                position: self.watermark_position.clone(),
            });
        }
        if !self.post.is_empty() {
            options.args = self.post.clone();
        }
        Ok(options)
    }
}

#[derive(Parser)]
#[command(name = "downsize")]
#[command(about = "Resize images, transcode videos and grab still frames")]
#[command(long_about = "\
Resize images, transcode videos and grab still frames

Images are processed in-process; video and still-frame jobs need ffmpeg,
either on PATH or configured in downsize.toml.

Examples:

  downsize image photo.jpg out/photo.jpg --width 1200 --quality 80
  downsize image banner.png out/banner.jpg --width 600 --height 200 \\
      --watermark logo.png --watermark-position SouthEast
  downsize image loop.gif out/loop.gif --width 320 --animated
  downsize video clip.mts out/clip.mp4 --width 1280
  downsize still clip.mp4 out/poster.jpg --height 200

Run 'downsize gen-config' to generate a documented downsize.toml.")]
#[command(version)]
struct Cli {
    /// Config file (used when present)
    #[arg(long, default_value = "downsize.toml", global = true)]
    config: PathBuf,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert and/or resize an image
    Image(JobArgs),
    /// Transcode a video with ffmpeg
    Video(JobArgs),
    /// Extract a still frame from a video and resize it
    Still(JobArgs),
    /// Print a stock downsize.toml with all options documented
    GenConfig,
    /// Report whether ffmpeg can be found
    Tools,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "downsize=debug".to_string()
        } else {
            "downsize=warn".to_string()
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Image(job) => {
            let options = job.conversion_options()?;
            let converter = image_converter(&cli.config)?;
            converter.image(&job.source, &job.target, &options)?;
            output::print_done(&job.target);
        }
        Command::Video(job) => {
            let options = job.conversion_options()?;
            let converter = Converter::from_config(config::load_config(&cli.config)?)?;
            let (tx, printer) = spawn_printer();
            let result = converter.video(&job.source, &job.target, &options, Some(tx));
            join_printer(printer);
            result?;
            output::print_done(&job.target);
        }
        Command::Still(job) => {
            let options = job.conversion_options()?;
            let converter = Converter::from_config(config::load_config(&cli.config)?)?;
            let (tx, printer) = spawn_printer();
            let result = converter.still(&job.source, &job.target, &options, Some(tx));
            join_printer(printer);
            result?;
            output::print_done(&job.target);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Tools => {
            let config = config::load_config(&cli.config)?;
            match FfmpegEngine::locate(config.video.ffmpeg.as_deref()) {
                Ok(engine) => {
                    let version = engine.version();
                    output::print_tool_status(
                        "ffmpeg",
                        Some(engine.program()),
                        version.as_deref(),
                    );
                }
                Err(EngineError::ToolNotFound { tool }) => {
                    output::print_tool_status(&tool, None, None)
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    Ok(())
}

/// Image jobs never spawn ffmpeg, so a missing binary is not an error here.
fn image_converter(
    config_path: &std::path::Path,
) -> Result<Converter, Box<dyn std::error::Error>> {
    let config = config::load_config(config_path)?;
    let engine = FfmpegEngine::locate(config.video.ffmpeg.as_deref())
        .unwrap_or_else(|_| FfmpegEngine::new(PathBuf::from("ffmpeg")));
    Ok(Converter::new(
        downsize::imaging::RustBackend::new(),
        engine,
        config,
    ))
}

/// Print job events on a dedicated thread until the sender is dropped.
fn spawn_printer() -> (Sender<JobEvent>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_job_event(&event) {
                println!("{}", line);
            }
        }
    });
    (tx, printer)
}

fn join_printer(printer: JoinHandle<()>) {
    if printer.join().is_err() {
        eprintln!("event printer panicked");
    }
}
