use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use image::DynamicImage;
use nova_studio::{
    logger::{self, LogLevel, LoggerConfig},
    tools::{self, background, condition, inpainting, outpainting, text_to_image},
    BedrockClient, BedrockError, Config, ControlMode, ImageClient, ImageSize,
    Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Generate and edit images with Amazon Bedrock Nova Canvas.
#[derive(Parser, Debug)]
#[command(name = "nova-studio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory generated images are written to.
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the request body instead of calling the model.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Also write the mask and canvas built locally by inpaint/outpaint.
    #[arg(long, global = true)]
    save_intermediate: bool,

    /// AWS region hosting the model.
    #[arg(long, global = true)]
    region: Option<String>,

    /// Model id to invoke.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write log entries as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Also append log entries to this file.
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate images from a text prompt.
    TextToImage(TextToImageArgs),
    /// Generate images that follow the edges or segments of a reference image.
    Condition(ConditionArgs),
    /// Remove the background of an image.
    RemoveBackground {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Repaint the regions drawn on a stroke layer.
    Inpaint(InpaintArgs),
    /// Extend an image onto a larger canvas.
    Outpaint(OutpaintArgs),
    /// List the models this tool knows about.
    Models,
}

#[derive(Args, Debug)]
struct GenerationArgs {
    /// Number of images to generate.
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=5))]
    num_images: u32,

    /// Output size, e.g. 512x512.
    #[arg(long, default_value = "384x576", value_parser = parse_size)]
    size: ImageSize,

    /// How strongly the image follows the prompt.
    #[arg(long, default_value_t = tools::DEFAULT_CFG_SCALE, value_parser = parse_cfg_scale)]
    cfg_scale: f32,

    #[command(flatten)]
    seed: SeedArg,
}

impl GenerationArgs {
    fn settings(&self) -> tools::GenerationSettings {
        tools::GenerationSettings {
            num_images: self.num_images,
            size: self.size,
            cfg_scale: self.cfg_scale,
            seed: self.seed.seed,
        }
    }
}

#[derive(Args, Debug)]
struct SeedArg {
    #[arg(long, default_value_t = tools::DEFAULT_SEED, value_parser = clap::value_parser!(u32).range(1..=858_993_459))]
    seed: u32,
}

#[derive(Args, Debug)]
struct TextToImageArgs {
    #[arg(value_name = "PROMPT")]
    prompt: String,

    #[arg(long, default_value = "")]
    negative_prompt: String,

    #[command(flatten)]
    generation: GenerationArgs,
}

#[derive(Args, Debug)]
struct ConditionArgs {
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    #[arg(value_name = "PROMPT")]
    prompt: String,

    #[arg(long, default_value = "")]
    negative_prompt: String,

    /// CANNY_EDGE or SEGMENTATION.
    #[arg(long, default_value = "CANNY_EDGE", value_parser = parse_control_mode)]
    control_mode: ControlMode,

    /// How closely the result follows the reference image.
    #[arg(long, default_value_t = condition::DEFAULT_CONTROL_STRENGTH, value_parser = parse_fraction)]
    control_strength: f32,

    #[command(flatten)]
    generation: GenerationArgs,
}

#[derive(Args, Debug)]
struct InpaintArgs {
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// RGBA image whose opaque pixels mark the area to repaint.
    #[arg(value_name = "STROKES")]
    strokes: PathBuf,

    #[arg(value_name = "PROMPT")]
    prompt: String,

    #[command(flatten)]
    seed: SeedArg,
}

#[derive(Args, Debug)]
struct OutpaintArgs {
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    #[arg(value_name = "PROMPT")]
    prompt: String,

    /// `image` sends the preserve mask, `prompt` describes what to keep.
    #[arg(long, default_value = "image", value_parser = parse_mask_type)]
    mask_type: outpainting::MaskType,

    /// Required with `--mask-type prompt`.
    #[arg(long, default_value = "")]
    mask_prompt: String,

    /// Expanded canvas, 512x512 or 1024x1024.
    #[arg(long, default_value = "512x512", value_parser = parse_size)]
    size: ImageSize,

    /// 0.0 = left edge, 1.0 = right edge.
    #[arg(long, default_value_t = 0.5, value_parser = parse_position)]
    horizontal: f64,

    /// 0.0 = top edge, 1.0 = bottom edge.
    #[arg(long, default_value_t = 0.5, value_parser = parse_position)]
    vertical: f64,

    #[command(flatten)]
    seed: SeedArg,
}

fn parse_size(value: &str) -> std::result::Result<ImageSize, String> {
    value.parse().map_err(|e: BedrockError| e.to_string())
}

fn parse_control_mode(value: &str) -> std::result::Result<ControlMode, String> {
    value.parse().map_err(|e: BedrockError| e.to_string())
}

fn parse_mask_type(value: &str) -> std::result::Result<outpainting::MaskType, String> {
    value.parse().map_err(|e: BedrockError| e.to_string())
}

fn parse_bounded(value: &str, min: f64, max: f64) -> std::result::Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("must be between {} and {}", min, max))
    }
}

fn parse_position(value: &str) -> std::result::Result<f64, String> {
    parse_bounded(value, 0.0, 1.0)
}

fn parse_fraction(value: &str) -> std::result::Result<f32, String> {
    parse_bounded(value, 0.0, 1.0).map(|parsed| parsed as f32)
}

fn parse_cfg_scale(value: &str) -> std::result::Result<f32, String> {
    let (min, max) = tools::CFG_SCALE_RANGE;
    parse_bounded(value, f64::from(min), f64::from(max)).map(|parsed| parsed as f32)
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = &cli.output_dir {
        config = config.with_output_dir(dir);
    }
    if cli.region.is_some() || cli.model.is_some() {
        let mut bedrock = config.bedrock.clone();
        if let Some(region) = &cli.region {
            bedrock = bedrock.with_region(region);
        }
        if let Some(model) = &cli.model {
            bedrock = bedrock.with_model(model);
        }
        config = config.with_bedrock(bedrock);
    }
    if cli.verbose {
        config = config.with_log_level(LogLevel::Debug);
    }
    if cli.log_json {
        config = config.with_log_json(true);
    }
    if let Some(path) = &cli.log_file {
        config = config.with_log_file(path);
    }

    if let Err(e) = logger::init_with_config(LoggerConfig::for_app(&config)) {
        eprintln!("{}", e);
    }

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::debug!("No .env file found, using system environment variables");
    }
    logger::log_config_info(&config);

    match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, config: &Config) -> Result<()> {
    let (name, prepared) = match &cli.command {
        Command::Models => {
            for model in ImageClient::supported_models() {
                println!(
                    "{} - {} ({}): {}",
                    model.id,
                    model.name,
                    model.provider,
                    model.tasks.join(", ")
                );
            }
            return Ok(());
        }
        Command::TextToImage(args) => (
            "text_to_image",
            text_to_image::prepare(&text_to_image::Inputs {
                prompt: args.prompt.clone(),
                negative_prompt: args.negative_prompt.clone(),
                settings: args.generation.settings(),
            })?,
        ),
        Command::Condition(args) => (
            "condition",
            condition::prepare(&condition::Inputs {
                image: Some(fs::read(&args.image)?),
                prompt: args.prompt.clone(),
                negative_prompt: args.negative_prompt.clone(),
                control_mode: args.control_mode,
                control_strength: args.control_strength,
                settings: args.generation.settings(),
            })?,
        ),
        Command::RemoveBackground { image } => (
            "background_removal",
            background::prepare(&background::Inputs {
                image: Some(fs::read(image)?),
            })?,
        ),
        Command::Inpaint(args) => (
            "inpainting",
            inpainting::prepare(&inpainting::Inputs {
                image: Some(fs::read(&args.image)?),
                stroke_layer: Some(fs::read(&args.strokes)?),
                prompt: args.prompt.clone(),
                seed: args.seed.seed,
            })?,
        ),
        Command::Outpaint(args) => (
            "outpainting",
            outpainting::prepare(&outpainting::Inputs {
                image: Some(fs::read(&args.image)?),
                prompt: args.prompt.clone(),
                mask_type: args.mask_type,
                mask_prompt: args.mask_prompt.clone(),
                size: args.size,
                horizontal: args.horizontal,
                vertical: args.vertical,
                seed: args.seed.seed,
            })?,
        ),
    };

    let Some(prepared) = prepared else {
        log::warn!("⚠️  Required input missing, nothing was sent");
        return Ok(());
    };

    if cli.save_intermediate {
        for (label, image) in &prepared.intermediates {
            let prefix = format!("{}_{}", name, label);
            for path in save_images(&config.output_dir, &prefix, std::slice::from_ref(image))? {
                log::info!("💾 Saved {} to {}", label, path.display());
            }
        }
    }

    if cli.dry_run {
        println!("{}", serde_json::to_string_pretty(&prepared.body)?);
        return Ok(());
    }

    let client = BedrockClient::new(config.bedrock.clone()).await?;
    let generated = tools::submit(client.image(), &prepared.body).await?;

    for path in save_images(&config.output_dir, name, &generated.images)? {
        log::info!("💾 Image saved to: {}", path.display());
        println!("{}", path.display());
    }

    Ok(())
}

fn save_images(dir: &Path, prefix: &str, images: &[DynamicImage]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");

    images
        .iter()
        .enumerate()
        .map(|(index, image)| -> Result<PathBuf> {
            let path = dir.join(format!("{}_{}_{}.png", prefix, timestamp, index + 1));
            image.save(&path)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_outpaint() {
        let cli = Cli::try_parse_from([
            "nova-studio",
            "outpaint",
            "photo.png",
            "a beach",
            "--size",
            "1024x1024",
            "--horizontal",
            "0.25",
            "--dry-run",
        ])
        .unwrap();

        assert!(cli.dry_run);
        match cli.command {
            Command::Outpaint(args) => {
                assert_eq!(args.size, ImageSize::new(1024, 1024));
                assert_eq!(args.horizontal, 0.25);
                assert_eq!(args.mask_type, outpainting::MaskType::Image);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_logging_flags() {
        let cli = Cli::try_parse_from([
            "nova-studio",
            "models",
            "--log-json",
            "--log-file",
            "run.log",
        ])
        .unwrap();

        assert!(cli.log_json);
        assert_eq!(cli.log_file, Some(PathBuf::from("run.log")));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["nova-studio", "text-to-image", "x", "-n", "6"]).is_err());
        assert!(Cli::try_parse_from(["nova-studio", "text-to-image", "x", "--cfg-scale", "11"])
            .is_err());
        assert!(
            Cli::try_parse_from(["nova-studio", "text-to-image", "x", "--size", "500x500"])
                .is_err()
        );
        assert!(Cli::try_parse_from([
            "nova-studio",
            "outpaint",
            "a.png",
            "x",
            "--vertical",
            "1.5"
        ])
        .is_err());
    }
}
