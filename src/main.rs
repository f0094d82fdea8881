//! # Showcase CLI
//!
//! Command-line front end for the showcase compositor.
//!
//! ## Usage
//!
//! ```bash
//! # List templates and their slots
//! showcase templates
//!
//! # Desktop + phone mockup from two captures
//! showcase render --template desktop-mobile \
//!     --image site.png --image phone.png@mobile --out mockup.png
//!
//! # Before/after with dark browser chrome and custom labels
//! showcase render --template comparison --image old.png --image new.png \
//!     --frame before=browser-dark --text before-label=v1 --text after-label=v2 \
//!     --font Inter.ttf --background "#ffffff"
//!
//! # Compose from a JSON spec
//! showcase spec layout.json --out layout.png
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use showcase::{
    Compositor, ShowcaseError,
    frame::DeviceFrameKind,
    session::{download_filename, eligible_images},
    source::{CaptureKind, DeviceClass, SourceImage},
    spec::{CompositionSpec, ShowcaseConfig, load_image_file},
    state::{Background, CompositionState},
    template::{CUSTOM_TEMPLATE_ID, DEFAULT_TEMPLATE_ID, list_templates, require_template},
};

/// Showcase - device mockup compositor
#[derive(Parser, Debug)]
#[command(name = "showcase")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (font, filename_prefix)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available templates
    Templates,

    /// Compose image files into a showcase PNG
    Render {
        /// Input image, optionally tagged with a device class (PATH@mobile)
        #[arg(long = "image", value_name = "PATH[@CLASS]", required = true)]
        images: Vec<String>,

        /// Template id
        #[arg(long, default_value = DEFAULT_TEMPLATE_ID)]
        template: String,

        /// Frame override for a slot (SLOT=KIND)
        #[arg(long = "frame", value_name = "SLOT=KIND")]
        frames: Vec<String>,

        /// Text slot value (ID=VALUE)
        #[arg(long = "text", value_name = "ID=VALUE")]
        texts: Vec<String>,

        /// Background: #rrggbb, #rrggbb,#rrggbb or transparent
        #[arg(long)]
        background: Option<String>,

        /// TTF/OTF font for template text
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Output PNG (defaults to a timestamped name in the current directory)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Compose from a JSON composition spec
    Spec {
        /// Spec file; image paths resolve relative to it
        file: PathBuf,

        /// TTF/OTF font for template text
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Output PNG
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showcase=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ShowcaseError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Templates => {
            for t in list_templates() {
                println!("{:<15} {} {}", t.id, t.icon, t.name);
                for slot in t.slots {
                    println!("    slot {:<14} {} (default frame: {})", slot.id, slot.label, slot.default_frame);
                }
                for text in t.text_slots {
                    println!("    text {:<14} {} (default: \"{}\")", text.id, text.label, text.default_value);
                }
            }
            println!("\nFrames:");
            for kind in DeviceFrameKind::ALL {
                println!("    {:<16} {}", kind.id(), kind.label());
            }
        }

        Commands::Render {
            images,
            template,
            frames,
            texts,
            background,
            font,
            out,
        } => {
            let config = load_config(cli.config.as_deref(), font)?;
            let images = usable_images(
                images
                    .iter()
                    .map(|arg| parse_image_arg(arg))
                    .collect::<Result<Vec<_>, _>>()?,
            )?;
            let state = build_state(&template, &images, &frames, &texts, background.as_deref())?;
            render_to_file(&config, &state, out).await?;
        }

        Commands::Spec { file, font, out } => {
            let config = load_config(cli.config.as_deref(), font)?;
            let spec = CompositionSpec::load(&file)?;
            let base = file.parent().unwrap_or_else(|| Path::new("."));
            let images = spec.load_images(base)?;
            let state = spec.build_state(&images)?;
            render_to_file(&config, &state, out).await?;
        }
    }

    Ok(())
}

/// Config file if given, with `--font` taking precedence.
fn load_config(path: Option<&Path>, font: Option<PathBuf>) -> Result<ShowcaseConfig, ShowcaseError> {
    let mut config = match path {
        Some(path) => ShowcaseConfig::load(path)?,
        None => ShowcaseConfig::default(),
    };
    if font.is_some() {
        config.font = font;
    }
    Ok(config)
}

/// Drop captures a showcase cannot use (video).
fn usable_images(images: Vec<SourceImage>) -> Result<Vec<SourceImage>, ShowcaseError> {
    let total = images.len();
    let images = eligible_images(images);
    if images.len() < total {
        warn!(skipped = total - images.len(), "video captures cannot be composed");
    }
    if images.is_empty() {
        return Err(ShowcaseError::EmptySelection);
    }
    Ok(images)
}

/// `PATH` or `PATH@CLASS`. Full-page captures are `PATH@CLASS:fullpage`.
fn parse_image_arg(arg: &str) -> Result<SourceImage, ShowcaseError> {
    let (path, tag) = match arg.rsplit_once('@') {
        Some((path, tag)) if !tag.contains(['/', '\\']) => (path, Some(tag)),
        _ => (arg, None),
    };
    let (class, kind) = match tag {
        None => (DeviceClass::Desktop, CaptureKind::Viewport),
        Some(tag) => match tag.split_once(':') {
            Some((class, kind)) => (class.parse()?, kind.parse()?),
            None => (tag.parse()?, CaptureKind::Viewport),
        },
    };
    load_image_file(Path::new(path), class, kind)
}

fn split_pair<'a>(arg: &'a str, what: &str) -> Result<(&'a str, &'a str), ShowcaseError> {
    arg.split_once('=')
        .ok_or_else(|| ShowcaseError::InvalidValue(format!("expected {} as KEY=VALUE, got '{}'", what, arg)))
}

fn build_state(
    template_id: &str,
    images: &[SourceImage],
    frames: &[String],
    texts: &[String],
    background: Option<&str>,
) -> Result<CompositionState, ShowcaseError> {
    let template = require_template(template_id)?;
    let mut state = CompositionState::new(DEFAULT_TEMPLATE_ID)?;
    state.switch_template(template.id, images)?;

    if template.id == CUSTOM_TEMPLATE_ID && !frames.is_empty() {
        return Err(ShowcaseError::InvalidValue(
            "--frame applies to template slots; the custom template has none".into(),
        ));
    }
    for frame in frames {
        let (slot, kind) = split_pair(frame, "--frame")?;
        state.set_slot_frame(template.id, slot, kind.parse()?)?;
    }
    for text in texts {
        let (id, value) = split_pair(text, "--text")?;
        state.set_text(id, value)?;
    }
    if let Some(bg) = background {
        state.set_background(Background::parse(bg)?);
    }
    state.select_item(None)?;
    Ok(state)
}

async fn render_to_file(config: &ShowcaseConfig, state: &CompositionState, out: Option<PathBuf>) -> Result<(), ShowcaseError> {
    let compositor: Compositor = config.compositor()?;
    let surface = compositor.render(state).await?;
    let png = surface.encode_png()?;

    let path = out.unwrap_or_else(|| PathBuf::from(download_filename(&config.filename_prefix, chrono::Local::now())));
    tokio::fs::write(&path, png).await?;
    info!(template = state.template_id(), path = %path.display(), "showcase rendered");
    println!("Saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use showcase::ImageId;
    use std::sync::Arc;

    fn capture(id: &str, kind: CaptureKind) -> SourceImage {
        SourceImage {
            id: ImageId::new(id),
            data: Arc::new(Vec::new()),
            pixel_width: 1600,
            pixel_height: 900,
            device_class: DeviceClass::Desktop,
            capture_kind: kind,
            domain: "example.com".into(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_video_captures_are_not_composed() {
        let images = vec![capture("clip", CaptureKind::Video), capture("page", CaptureKind::Viewport)];
        let usable = usable_images(images).unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].id.as_str(), "page");

        let only_video = vec![capture("clip", CaptureKind::Video)];
        assert!(matches!(usable_images(only_video), Err(ShowcaseError::EmptySelection)));
    }

    #[test]
    fn test_frame_override_rejected_on_custom() {
        let images = vec![capture("page", CaptureKind::Viewport)];
        let frames = vec!["main=phone".to_string()];
        let err = build_state(CUSTOM_TEMPLATE_ID, &images, &frames, &[], None).unwrap_err();
        assert!(matches!(err, ShowcaseError::InvalidValue(_)));

        let state = build_state(DEFAULT_TEMPLATE_ID, &images, &frames, &[], None).unwrap();
        assert_eq!(state.slot_frame(state.template(), "main"), Some(DeviceFrameKind::Phone));
    }

    #[test]
    fn test_font_flag_overrides_config() {
        let config = load_config(None, Some(PathBuf::from("Inter.ttf"))).unwrap();
        assert_eq!(config.font, Some(PathBuf::from("Inter.ttf")));
        assert_eq!(config.filename_prefix, "showcase");
    }
}
