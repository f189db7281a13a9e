use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use facelab_core::{KnownFaceStore, LabelFont, RecognitionEngine};
use facelab_media::{load_image, save_frame, CameraSource, FrameDirSource, PngSink};
use facelab_vision::{OnnxFaceEncoder, OnnxFaceLocator};
use std::path::PathBuf;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "facelab", about = "Face enrollment and recognition demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enroll a face from an image into the known-face store
    Enroll {
        /// Image containing the face to enroll
        #[arg(short, long)]
        image: PathBuf,
        /// Name of the person
        #[arg(short, long)]
        name: String,
    },
    /// Recognize faces in an image and write an annotated copy
    Recognize {
        /// Image to recognize faces in
        #[arg(short, long)]
        image: PathBuf,
        /// Annotated output path
        #[arg(short, long, default_value = "annotated.png")]
        output: PathBuf,
    },
    /// Recognize faces in a frame stream (camera or frame directory)
    Watch {
        /// Directory of image frames to use instead of the camera
        #[arg(long)]
        frames_dir: Option<PathBuf>,
        /// Directory for annotated output frames
        #[arg(long, default_value = "frames_out")]
        output_dir: PathBuf,
        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// List enrolled faces
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let cli = Cli::parse();

    match cli.command {
        Commands::Enroll { image, name } => {
            let frame = load_image(&image)?;
            let mut engine = build_engine(&config)?;
            engine.enroll(frame, &name)?;
            println!("Enrolled {name} ({} known faces)", engine.store().len());
        }
        Commands::Recognize { image, output } => {
            let frame = load_image(&image)?;
            let mut engine = build_engine(&config)?;
            let annotated = engine.recognize(frame)?;
            save_frame(&annotated, &output)?;
            println!("Annotated image written to {}", output.display());
        }
        Commands::Watch { frames_dir, output_dir, max_frames } => {
            let mut engine = build_engine(&config)?;
            let mut sink = PngSink::create(&output_dir, max_frames)?;

            // Each source is dropped at the end of its arm, releasing the
            // handle on every exit path, errors included.
            match frames_dir {
                Some(dir) => {
                    let mut source = FrameDirSource::open(&dir)
                        .with_context(|| format!("cannot open frame directory {}", dir.display()))?;
                    engine.run_stream(&mut source, &mut sink)?;
                }
                None => {
                    let mut source = CameraSource::open(&config.camera_device)?;
                    engine.run_stream(&mut source, &mut sink)?;
                }
            }
            println!("Wrote {} annotated frames to {}", sink.written(), output_dir.display());
        }
        Commands::List => {
            let store = KnownFaceStore::load(&config.store_path)?;
            if store.is_empty() {
                println!("No faces enrolled ({})", config.store_path.display());
            } else {
                for entry in store.entries() {
                    println!("{} ({} dims)", entry.name, entry.embedding.len());
                }
            }
        }
    }

    Ok(())
}

/// Load models, store and font, and assemble the engine. Fails fast when
/// a model file is missing; a missing font only downgrades labels to the
/// name strip without text.
fn build_engine(config: &Config) -> Result<RecognitionEngine<OnnxFaceLocator, OnnxFaceEncoder>> {
    let locator = OnnxFaceLocator::load(&config.detector_model_path())?;
    let encoder = OnnxFaceEncoder::load(&config.encoder_model_path())?;
    let store = KnownFaceStore::load(&config.store_path)?;

    let mut engine =
        RecognitionEngine::new(locator, encoder, store).with_threshold(config.match_threshold);

    match LabelFont::load(&config.font_path) {
        Ok(font) => engine = engine.with_font(font),
        Err(e) => {
            tracing::warn!(error = %e, "label font unavailable; drawing name strips without text");
        }
    }

    Ok(engine)
}
