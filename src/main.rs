use clap::{Parser, Subcommand};
use imgchain::config::{self, ImageConfig};
use imgchain::{ImageHandle, SaveOutcome, pipeline};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgchain")]
#[command(about = "Chainable image transforms for PNG, GIF and JPEG")]
#[command(long_about = "\
Chainable image transforms for PNG, GIF and JPEG

Ops are applied left to right to a single image:

  resize:WxH            exact size, aspect ratio ignored
  crop:WxH[+X+Y]        reframe; negative offsets pad with transparency
  rotate:DEG            counter-clockwise, canvas grows to fit
  overlay:PATH[@X,Y]    paste another image
  mask:PATH[@X,Y]       alpha from another image's red channel
  percent:F             scale both sides by F (1.0 = 100%)
  fit:WxH               downscale into a bounding box
  fill:WxH              scale to cover and center-crop
  reset                 reload the original

Examples:

  imgchain apply photo.jpg --op fill:300x300 --op rotate:90 --output thumb
  imgchain info photo.jpg --json

Run 'imgchain gen-config' to generate a documented imgchain.toml.")]
#[command(version)]
struct Cli {
    /// Config file, or a directory containing imgchain.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log each transform (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the format and size of an image
    Info {
        path: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a chain of ops and save the result
    Apply {
        path: String,
        /// Op to apply; repeat for a chain
        #[arg(long = "op", required = true)]
        ops: Vec<String>,
        /// Where to save. A bare name lands beside the source with its
        /// extension. Omit to write the encoded image to stdout.
        #[arg(long)]
        output: Option<String>,
    },
    /// Print a stock imgchain.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct ImageInfo<'a> {
    path: &'a str,
    mime: &'a str,
    width: u32,
    height: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let image_config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(format!("config file not found: {}", path.display()).into());
        }
        Some(path) => config::load_config(path)?,
        None => ImageConfig::default(),
    };
    init_thread_pool(&image_config.processing);

    match cli.command {
        Command::Info { path, json } => {
            let handle = ImageHandle::open_with_config(path.as_str(), &image_config)?;
            let size = handle.size();
            let info = ImageInfo {
                path: handle.locator(),
                mime: handle.mime(),
                width: size.width,
                height: size.height,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}: {} {}x{}", info.path, info.mime, info.width, info.height);
            }
        }
        Command::Apply { path, ops, output } => {
            let ops = pipeline::parse_ops(&ops)?;
            let mut handle = ImageHandle::open_with_config(path.as_str(), &image_config)?;
            pipeline::run(&mut handle, &ops)?;

            match handle.save(output.as_deref())? {
                SaveOutcome::Written(target) => {
                    let size = handle.size();
                    eprintln!("{target} ({}x{})", size.width, size.height);
                }
                SaveOutcome::Bytes(bytes) => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    stdout.flush()?;
                }
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Size the global rayon pool the resampler runs on.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
