use serde::{Deserialize, Serialize};

/// Rectangular face region within a frame.
///
/// Stored in top/right/bottom/left order, the convention the locator
/// reports in. All other coordinate views (x/y/width/height) go through
/// the named accessors so the two conventions never get transposed at a
/// component boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Region {
    pub fn x(&self) -> u32 {
        self.left
    }

    pub fn y(&self) -> u32 {
        self.top
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

/// Face embedding vector (128-dimensional for the shipped encoder model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding {
    pub values: Vec<f32>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Euclidean distance between two embeddings. Lower = more similar.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// One named entry in the known-face store.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownFaceEntry {
    pub name: String,
    pub embedding: Embedding,
}

/// Label assigned to one located face. `name` is `"Unknown"` when no
/// stored entry matched within threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub region: Region,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_accessors() {
        let r = Region { top: 10, right: 110, bottom: 90, left: 30 };
        assert_eq!(r.x(), 30);
        assert_eq!(r.y(), 10);
        assert_eq!(r.width(), 80);
        assert_eq!(r.height(), 80);
    }

    #[test]
    fn test_region_degenerate_saturates() {
        // right < left should not underflow
        let r = Region { top: 5, right: 3, bottom: 2, left: 8 };
        assert_eq!(r.width(), 0);
        assert_eq!(r.height(), 0);
    }

    #[test]
    fn test_euclidean_distance_identical() {
        let a = Embedding::new(vec![0.5, -0.25, 1.0]);
        assert!(a.euclidean_distance(&a).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_distance_unit_axes() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![0.0, 1.0]);
        assert!((a.euclidean_distance(&b) - 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_serializes_as_bare_array() {
        let e = Embedding::new(vec![1.0, 2.0]);
        let json = serde_json::to_string(&e).unwrap();
        assert_eq!(json, "[1.0,2.0]");
    }
}
