use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use inkmark::{
    Config,
    export::{ItemOutcome, export_batch},
    import::ImageList,
    preview, session::Session, startup_checks, template,
    watermark::{Anchor, NamingMode, OutputFormat, ResizeMode, Rgb, WatermarkConfig},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch watermarking for photo collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the supported images found in files and directories
    List {
        inputs: Vec<PathBuf>,
    },
    /// Render a watermarked preview of one of the listed images
    Preview {
        inputs: Vec<PathBuf>,
        /// Position of the image to preview in the discovered list
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// Where to write the preview PNG
        #[arg(short, long)]
        out: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Use a template instead of the current session
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
    /// Watermark and export every image found in the inputs
    Export {
        inputs: Vec<PathBuf>,
        /// Export directory (defaults to the configured one)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Use a template instead of the current session
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
    /// Edit the current session's watermark settings
    Set(SetArgs),
    /// Drag the watermark by a pixel delta
    Nudge {
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dx: i32,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        dy: i32,
    },
    /// Save, load or print templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    /// Save the current session as a template
    Save { path: PathBuf },
    /// Replace the current session with a template
    Load { path: PathBuf },
    /// Print the current session as template JSON
    Show,
}

#[derive(Args, Debug, Default)]
struct SetArgs {
    #[arg(long, action = clap::ArgAction::Set)]
    use_text: Option<bool>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    text_opacity: Option<u8>,
    #[arg(long)]
    font: Option<PathBuf>,
    /// Forget the explicit font and use the fallback chain
    #[arg(long)]
    clear_font: bool,
    #[arg(long)]
    font_size: Option<u32>,
    #[arg(long, action = clap::ArgAction::Set)]
    stroke: Option<bool>,
    #[arg(long)]
    stroke_width: Option<u32>,
    /// "r,g,b"
    #[arg(long, value_parser = parse_rgb)]
    stroke_color: Option<Rgb>,
    #[arg(long, value_parser = parse_rgb)]
    fill_color: Option<Rgb>,
    #[arg(long, action = clap::ArgAction::Set)]
    shadow: Option<bool>,
    /// "dx,dy"
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    shadow_offset: Option<(i32, i32)>,
    #[arg(long, action = clap::ArgAction::Set)]
    use_image: Option<bool>,
    #[arg(long)]
    mark: Option<PathBuf>,
    #[arg(long)]
    mark_opacity: Option<u8>,
    #[arg(long)]
    mark_scale: Option<u32>,
    /// One of tl, tm, tr, ml, center, mr, bl, bm, br
    #[arg(long, value_parser = parse_anchor)]
    anchor: Option<Anchor>,
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<i32>,
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,
    #[arg(long, action = clap::ArgAction::Set)]
    allow_drag: Option<bool>,
    /// keep, prefix or suffix
    #[arg(long)]
    naming: Option<String>,
    #[arg(long)]
    naming_text: Option<String>,
    /// PNG or JPEG
    #[arg(long)]
    format: Option<String>,
    #[arg(long)]
    quality: Option<u8>,
    /// none, by_width, by_height or by_percent
    #[arg(long)]
    resize: Option<String>,
    #[arg(long)]
    resize_value: Option<u32>,
}

fn parse_rgb(value: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected r,g,b but got {:?}", value));
    }
    let mut rgb = [0u8; 3];
    for (slot, part) in rgb.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid color component {:?}: {}", part, e))?;
    }
    Ok(rgb)
}

fn parse_pair(value: &str) -> Result<(i32, i32), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {:?}", value))?;
    let x = x.trim().parse().map_err(|e| format!("invalid x {:?}: {}", x, e))?;
    let y = y.trim().parse().map_err(|e| format!("invalid y {:?}: {}", y, e))?;
    Ok((x, y))
}

fn parse_anchor(value: &str) -> Result<Anchor, String> {
    Anchor::from_tag(value).ok_or_else(|| format!("unknown anchor {:?}", value))
}

fn apply_set_args(config: &mut WatermarkConfig, args: SetArgs) {
    if let Some(v) = args.use_text {
        config.use_text = v;
    }
    if let Some(v) = args.text {
        config.text.text = v;
    }
    if let Some(v) = args.text_opacity {
        config.text.opacity = v.min(100);
    }
    if args.clear_font {
        config.text.font_path = None;
    }
    if let Some(v) = args.font {
        config.text.font_path = Some(v);
    }
    if let Some(v) = args.font_size {
        config.text.font_size = v;
    }
    if let Some(v) = args.stroke {
        config.text.stroke = v;
    }
    if let Some(v) = args.stroke_width {
        config.text.stroke_width = v;
    }
    if let Some(v) = args.stroke_color {
        config.text.stroke_color = v;
    }
    if let Some(v) = args.fill_color {
        config.text.fill_color = v;
    }
    if let Some(v) = args.shadow {
        config.text.shadow = v;
    }
    if let Some(v) = args.shadow_offset {
        config.text.shadow_offset = v;
    }
    if let Some(v) = args.use_image {
        config.use_image = v;
    }
    if let Some(v) = args.mark {
        config.image.path = Some(v);
    }
    if let Some(v) = args.mark_opacity {
        config.image.opacity = v.min(100);
    }
    if let Some(v) = args.mark_scale {
        config.image.scale_percent = v.max(1);
    }
    if let Some(v) = args.anchor {
        config.layout.anchor = v;
    }
    if let Some(v) = args.offset_x {
        config.layout.offset_x = v;
    }
    if let Some(v) = args.offset_y {
        config.layout.offset_y = v;
    }
    if let Some(v) = args.rotation {
        config.layout.rotation_deg = v;
    }
    if let Some(v) = args.allow_drag {
        config.layout.allow_drag = v;
    }
    if let Some(v) = args.naming {
        config.export.mode = NamingMode::from_tag(&v);
    }
    if let Some(v) = args.naming_text {
        config.export.text = v;
    }
    if let Some(v) = args.format {
        config.export.out_format = OutputFormat::from_tag(&v.to_uppercase());
    }
    if let Some(v) = args.quality {
        config.export.jpeg_quality = v.min(100);
    }
    if let Some(v) = args.resize {
        config.export.resize_mode = ResizeMode::from_tag(&v);
    }
    if let Some(v) = args.resize_value {
        config.export.resize_value = v.max(1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(&cli.config)?;
    if let Err(errors) = startup_checks::perform_startup_checks(&config) {
        for error in &errors {
            tracing::warn!("Startup check failed: {}", error);
        }
    }

    let mut session = Session::load(&config.paths.state_file);

    match cli.command {
        Commands::List { inputs } => list_images(&config, &inputs),
        Commands::Preview {
            inputs,
            index,
            out,
            width,
            height,
            template,
        } => {
            let mut list = ImageList::new();
            list.add(&inputs);
            if !list.select(index) && !list.is_empty() {
                return Err(format!("no image at position {} ({} listed)", index, list.len()).into());
            }
            let Some(image) = list.current() else {
                println!("No images to preview");
                return Ok(());
            };

            let watermark = resolve_watermark(&session, template.as_deref())?;
            let display = (
                width.unwrap_or(config.preview.width),
                height.unwrap_or(config.preview.height),
            );
            let rendered =
                preview::render_preview(&config.compositor(), image, &watermark, display)?;
            rendered.save(&out)?;
            println!(
                "Preview of {} written to {} ({}x{})",
                image.display(),
                out.display(),
                rendered.width(),
                rendered.height()
            );
            Ok(())
        }
        Commands::Export {
            inputs,
            out,
            template,
        } => {
            let watermark = resolve_watermark(&session, template.as_deref())?;
            let target = out.unwrap_or_else(|| config.paths.export_dir.clone());
            run_export(&config, &inputs, &target, &watermark)
        }
        Commands::Set(args) => {
            session.update(|watermark| apply_set_args(watermark, args));
            println!("{}", template::to_json(&session.snapshot())?);
            Ok(())
        }
        Commands::Nudge { dx, dy } => {
            if session.drag(dx, dy) {
                let layout = session.snapshot().layout;
                println!("Offset is now ({}, {})", layout.offset_x, layout.offset_y);
            } else {
                println!("Dragging is disabled; offsets unchanged");
            }
            Ok(())
        }
        Commands::Template(cmd) => match cmd {
            TemplateCommands::Save { path } => {
                session.save_template(&path)?;
                println!("Template saved to {}", path.display());
                Ok(())
            }
            TemplateCommands::Load { path } => {
                session.load_template(&path)?;
                println!("Template loaded from {}", path.display());
                Ok(())
            }
            TemplateCommands::Show => {
                println!("{}", template::to_json(&session.snapshot())?);
                Ok(())
            }
        },
    }
}

fn resolve_watermark(
    session: &Session,
    template_path: Option<&Path>,
) -> Result<WatermarkConfig, Box<dyn std::error::Error>> {
    match template_path {
        Some(path) => Ok(template::load_template(path)?),
        None => Ok(session.snapshot()),
    }
}

fn list_images(config: &Config, inputs: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let mut list = ImageList::new();
    list.add(inputs);

    let thumbnails = list.thumbnails(config.preview.thumbnail_size);
    for thumb in &thumbnails {
        println!(
            "{} ({}x{} thumbnail)",
            thumb.path.display(),
            thumb.image.width(),
            thumb.image.height()
        );
    }
    println!(
        "{} image(s) found, {} readable",
        list.len(),
        thumbnails.len()
    );
    Ok(())
}

fn run_export(
    config: &Config,
    inputs: &[PathBuf],
    target: &Path,
    watermark: &WatermarkConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut list = ImageList::new();
    list.add(inputs);
    if list.is_empty() {
        println!("No images to export");
        return Ok(());
    }

    info!("Exporting {} image(s) to {:?}", list.len(), target);
    let summary = export_batch(
        &config.compositor(),
        list.paths(),
        target,
        watermark,
        |progress| println!("[{:>3}%] {}/{}", progress.percent, progress.done, progress.total),
    )?;

    for (source, outcome) in &summary.items {
        match outcome {
            ItemOutcome::Exported(path) => {
                println!("  {} -> {}", source.display(), path.display())
            }
            ItemOutcome::Refused => println!(
                "  {} skipped: export directory is its source directory",
                source.display()
            ),
            ItemOutcome::Failed(e) => println!("  {} failed: {}", source.display(), e),
        }
    }
    println!("Processed {} image(s).", summary.attempted());
    Ok(())
}
