//! Wire types for the remote vision API (Azure Computer Vision `analyze`
//! v3.2 shape) and the derived per-request analysis result.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedObject {
    #[serde(rename = "object")]
    pub label: String,
    pub confidence: f64,
    pub rectangle: BoundingBox,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageTag {
    pub name: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageDescription {
    #[serde(default)]
    pub captions: Vec<Caption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

/// Raw response body of one analyze round trip. All sections are optional
/// on the wire; absent sections deserialize to empty.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawAnalysis {
    #[serde(default)]
    pub description: ImageDescription,
    #[serde(default)]
    pub tags: Vec<ImageTag>,
    #[serde(default)]
    pub objects: Vec<DetectedObject>,
}

/// Final analysis result: the raw sections plus the derived subset of
/// objects matching the configured target labels. Point-in-time, tied to
/// the frame snapshot that produced it; never cached.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub description: String,
    pub tags: Vec<ImageTag>,
    pub objects: Vec<DetectedObject>,
    pub hat_objects: Vec<DetectedObject>,
}

impl Analysis {
    /// Partition detected objects into the full set and the target-label
    /// subset. Matching is case-insensitive and exact.
    pub fn from_raw(raw: RawAnalysis, target_labels: &[String]) -> Self {
        let description = raw
            .description
            .captions
            .first()
            .map(|c| c.text.clone())
            .unwrap_or_default();

        let hat_objects = raw
            .objects
            .iter()
            .filter(|obj| {
                target_labels
                    .iter()
                    .any(|target| target.eq_ignore_ascii_case(&obj.label))
            })
            .cloned()
            .collect();

        Analysis {
            description,
            tags: raw.tags,
            objects: raw.objects,
            hat_objects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(label: &str, confidence: f64) -> DetectedObject {
        DetectedObject {
            label: label.to_string(),
            confidence,
            rectangle: BoundingBox { x: 0, y: 0, w: 10, h: 10 },
        }
    }

    fn targets() -> Vec<String> {
        vec!["hat".to_string(), "cap".to_string(), "headwear".to_string()]
    }

    #[test]
    fn parses_azure_analyze_response() {
        let body = r#"{
            "description": {"captions": [{"text": "a person wearing a hat", "confidence": 0.87}]},
            "tags": [{"name": "person", "confidence": 0.99}, {"name": "hat", "confidence": 0.93}],
            "objects": [
                {"rectangle": {"x": 10, "y": 20, "w": 50, "h": 60}, "object": "hat", "confidence": 0.91},
                {"rectangle": {"x": 5, "y": 80, "w": 100, "h": 120}, "object": "shirt", "confidence": 0.80}
            ]
        }"#;
        let raw: RawAnalysis = serde_json::from_str(body).unwrap();
        assert_eq!(raw.tags.len(), 2);
        assert_eq!(raw.objects.len(), 2);
        assert_eq!(raw.objects[0].label, "hat");
        assert_eq!(raw.objects[0].rectangle, BoundingBox { x: 10, y: 20, w: 50, h: 60 });
        assert_eq!(raw.description.captions[0].text, "a person wearing a hat");
    }

    #[test]
    fn missing_sections_deserialize_empty() {
        let raw: RawAnalysis = serde_json::from_str("{}").unwrap();
        assert!(raw.tags.is_empty());
        assert!(raw.objects.is_empty());
        assert!(raw.description.captions.is_empty());
    }

    #[test]
    fn partitions_hat_objects_from_detections() {
        let raw = RawAnalysis {
            description: ImageDescription::default(),
            tags: Vec::new(),
            objects: vec![object("hat", 0.91), object("shirt", 0.80)],
        };
        let analysis = Analysis::from_raw(raw, &targets());
        assert_eq!(analysis.objects.len(), 2);
        assert_eq!(analysis.hat_objects.len(), 1);
        assert_eq!(analysis.hat_objects[0].label, "hat");
        assert_eq!(analysis.hat_objects[0].confidence, 0.91);
    }

    #[test]
    fn label_matching_is_case_insensitive_and_exact() {
        let raw = RawAnalysis {
            description: ImageDescription::default(),
            tags: Vec::new(),
            objects: vec![
                object("Hat", 0.9),
                object("HEADWEAR", 0.8),
                // Exact match only: "hard hat" is not a target label.
                object("hard hat", 0.7),
            ],
        };
        let analysis = Analysis::from_raw(raw, &targets());
        assert_eq!(analysis.hat_objects.len(), 2);
    }

    #[test]
    fn description_uses_first_caption() {
        let raw = RawAnalysis {
            description: ImageDescription {
                captions: vec![
                    Caption { text: "first".to_string(), confidence: 0.9 },
                    Caption { text: "second".to_string(), confidence: 0.5 },
                ],
            },
            tags: Vec::new(),
            objects: Vec::new(),
        };
        let analysis = Analysis::from_raw(raw, &targets());
        assert_eq!(analysis.description, "first");
    }
}
