use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rekognition::operation::compare_faces::CompareFacesOutput;
use aws_sdk_rekognition::types::{Image, S3Object};
use tracing::{debug, warn};

/// A face in the target picture that matched the reference face.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    /// 0-100.
    pub similarity: f32,
}

/// A face in the target picture that did not reach the similarity threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedFace {
    /// Detector confidence that this is a face at all, when reported.
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    pub matches: Vec<FaceMatch>,
    pub unmatched: Vec<UnmatchedFace>,
}

impl ComparisonResult {
    /// Human-readable summary, one line per matched and unmatched face.
    ///
    /// Every match line carries the similarity of the *first* match, not its
    /// own.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.matches.len() + self.unmatched.len());
        if let Some(first) = self.matches.first() {
            for _ in &self.matches {
                lines.push(format!(
                    "Similarity between compared faces is {}",
                    first.similarity
                ));
            }
        }
        for _ in &self.unmatched {
            lines.push("Faces either don't match or are a poor match".to_string());
        }
        lines
    }

    pub fn is_match(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Remote face comparison between two stored pictures.
#[async_trait]
pub trait FaceComparer: Send + Sync {
    /// Compare the face in `source_key` (the reference) against the faces in
    /// `target_key`, reporting matches at or above `threshold`.
    async fn compare(
        &self,
        source_key: &str,
        target_key: &str,
        threshold: f32,
    ) -> Result<ComparisonResult, CompareError>;
}

/// Amazon Rekognition `CompareFaces` over objects in one S3 bucket.
pub struct RekognitionComparer {
    client: aws_sdk_rekognition::Client,
    bucket: String,
}

impl RekognitionComparer {
    pub fn new(sdk_config: &SdkConfig, bucket: &str) -> Self {
        Self {
            client: aws_sdk_rekognition::Client::new(sdk_config),
            bucket: bucket.to_string(),
        }
    }

    fn s3_image(&self, key: &str) -> Image {
        Image::builder()
            .s3_object(S3Object::builder().bucket(&self.bucket).name(key).build())
            .build()
    }
}

#[async_trait]
impl FaceComparer for RekognitionComparer {
    async fn compare(
        &self,
        source_key: &str,
        target_key: &str,
        threshold: f32,
    ) -> Result<ComparisonResult, CompareError> {
        let resp = self
            .client
            .compare_faces()
            .source_image(self.s3_image(source_key))
            .target_image(self.s3_image(target_key))
            .similarity_threshold(threshold)
            .send()
            .await
            .map_err(|e| CompareError::Request(e.to_string()))?;

        let result = comparison_from_output(&resp);

        debug!(
            bucket = self.bucket,
            source_key,
            target_key,
            matches = result.matches.len(),
            unmatched = result.unmatched.len(),
            "compare faces response"
        );
        Ok(result)
    }
}

/// Matches that come back without a similarity score are dropped rather than
/// reported with a made-up one.
fn comparison_from_output(resp: &CompareFacesOutput) -> ComparisonResult {
    let mut matches = Vec::with_capacity(resp.face_matches().len());
    for m in resp.face_matches() {
        match m.similarity() {
            Some(similarity) => matches.push(FaceMatch { similarity }),
            None => warn!("face match without similarity score, skipping"),
        }
    }
    ComparisonResult {
        matches,
        unmatched: resp
            .unmatched_faces()
            .iter()
            .map(|f| UnmatchedFace {
                confidence: f.confidence(),
            })
            .collect(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("compare faces request failed: {0}")]
    Request(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(similarity: f32) -> FaceMatch {
        FaceMatch { similarity }
    }

    #[test]
    fn every_match_line_repeats_first_similarity() {
        let result = ComparisonResult {
            matches: vec![matched(90.0), matched(95.0)],
            unmatched: vec![UnmatchedFace {
                confidence: Some(99.1),
            }],
        };

        let lines = result.report_lines();
        let similarity_lines: Vec<_> = lines
            .iter()
            .filter(|l| l.starts_with("Similarity between compared faces is"))
            .collect();

        assert_eq!(similarity_lines.len(), 2);
        assert!(similarity_lines
            .iter()
            .all(|l| *l == "Similarity between compared faces is 90"));
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Faces either don't match or are a poor match");
    }

    #[test]
    fn fractional_similarity_is_printed_as_is() {
        let result = ComparisonResult {
            matches: vec![matched(99.5)],
            unmatched: Vec::new(),
        };
        assert_eq!(
            result.report_lines(),
            vec!["Similarity between compared faces is 99.5".to_string()]
        );
        assert!(result.is_match());
    }

    #[test]
    fn no_faces_no_lines() {
        let result = ComparisonResult::default();
        assert!(result.report_lines().is_empty());
        assert!(!result.is_match());
    }

    #[test]
    fn response_without_similarity_is_not_reported_as_zero() {
        use aws_sdk_rekognition::types::{CompareFacesMatch, ComparedFace};

        let resp = CompareFacesOutput::builder()
            .face_matches(CompareFacesMatch::builder().similarity(92.0).build())
            .face_matches(CompareFacesMatch::builder().build())
            .unmatched_faces(ComparedFace::builder().confidence(99.0).build())
            .build();

        let result = comparison_from_output(&resp);

        assert_eq!(result.matches, vec![matched(92.0)]);
        assert_eq!(
            result.unmatched,
            vec![UnmatchedFace {
                confidence: Some(99.0)
            }]
        );
        assert!(result
            .report_lines()
            .iter()
            .all(|l| !l.ends_with(" is 0")));
    }

    #[test]
    fn only_unmatched_faces() {
        let result = ComparisonResult {
            matches: Vec::new(),
            unmatched: vec![
                UnmatchedFace { confidence: None },
                UnmatchedFace {
                    confidence: Some(80.0),
                },
            ],
        };
        assert_eq!(
            result.report_lines(),
            vec![
                "Faces either don't match or are a poor match".to_string(),
                "Faces either don't match or are a poor match".to_string(),
            ]
        );
    }
}
