use serde::{Deserialize, Serialize};

/// One detected label with the provider's confidence score in [0, 1]
/// and, when the provider knows it, the knowledge-graph entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnnotation {
    pub description: String,
    pub score: f32,
    pub mid: Option<String>,
}

/// A dominant image color. Channels are normalized to 0–255; `score`
/// and `pixel_fraction` are the provider's prevalence measures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub score: f32,
    pub pixel_fraction: f32,
}

impl DominantColor {
    /// CSS-style rendering, the form persisted and fed to prompts.
    #[must_use]
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Normalized output of one label-detection pass. Entries keep the
/// provider's order; nothing is thresholded or filtered out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelSummary {
    pub labels: Vec<LabelAnnotation>,
    pub colors: Vec<DominantColor>,
    pub objects: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_rendering() {
        let color = DominantColor {
            red: 12,
            green: 0,
            blue: 255,
            score: 0.4,
            pixel_fraction: 0.1,
        };
        assert_eq!(color.css(), "rgb(12, 0, 255)");
    }
}
