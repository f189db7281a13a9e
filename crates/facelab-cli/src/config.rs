use std::path::PathBuf;

/// CLI configuration, loaded from `FACELAB_*` environment variables.
pub struct Config {
    /// Path to the known-face JSON store.
    pub store_path: PathBuf,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Euclidean distance threshold for a positive match.
    pub match_threshold: f32,
    /// V4L2 device path for `watch` without `--frames-dir`.
    pub camera_device: String,
    /// TTF/OTF font for label text; missing font degrades to strip-only.
    pub font_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("facelab");

        Self {
            store_path: std::env::var("FACELAB_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("known_faces.json")),
            model_dir: std::env::var("FACELAB_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| facelab_vision::default_model_dir()),
            match_threshold: env_f32("FACELAB_MATCH_THRESHOLD", facelab_core::MATCH_THRESHOLD),
            camera_device: std::env::var("FACELAB_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            font_path: std::env::var("FACELAB_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")
                }),
        }
    }

    /// Path to the face-detection model.
    pub fn detector_model_path(&self) -> String {
        self.model_dir.join("detect.onnx").to_string_lossy().into_owned()
    }

    /// Path to the face-embedding model.
    pub fn encoder_model_path(&self) -> String {
        self.model_dir.join("embed.onnx").to_string_lossy().into_owned()
    }
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
