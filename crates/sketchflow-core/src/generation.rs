//! Generation backend request/response model and stale-result tracking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Which representation a generation request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepresentationMode {
    /// Textual diagram description.
    #[serde(rename = "MERMAID")]
    Description,
    /// Graphical scene elements.
    #[serde(rename = "EXCALIDRAW")]
    Scene,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub diagram_type: RepresentationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, mode: RepresentationMode) -> Self {
        Self {
            prompt: prompt.into(),
            diagram_type: mode,
            model: None,
            chart_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub diagram_type: Option<String>,
}

impl GenerationResponse {
    /// The payload to classify: `data` then `code` in scene mode, `code` in description mode.
    /// Blank fields are skipped.
    pub fn payload(&self, mode: RepresentationMode) -> Result<&str, GenerationError> {
        fn non_blank(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|s| !s.trim().is_empty())
        }
        let payload = match mode {
            RepresentationMode::Scene => non_blank(&self.data).or_else(|| non_blank(&self.code)),
            RepresentationMode::Description => non_blank(&self.code),
        };
        payload.ok_or(GenerationError::EmptyResponse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("session expired; please sign in again")]
    Unauthorized,
    #[error("generation failed ({status}): {detail}")]
    Backend { status: u16, detail: String },
    #[error("the generation service returned no content")]
    EmptyResponse,
}

impl GenerationError {
    /// Maps a failed HTTP status and optional error detail.
    pub fn from_status(status: u16, detail: Option<&str>) -> Self {
        if status == 401 {
            return Self::Unauthorized;
        }
        Self::Backend {
            status,
            detail: detail
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("generation failed")
                .to_string(),
        }
    }

    /// The stored credentials should be discarded and the user sent back to sign-in.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Removes Markdown code fence markers (```` ```mermaid ````, ```` ```json ````, ```` ``` ````)
/// and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```mermaid", "")
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Identifies one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationToken(u64);

impl GenerationToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Issues increasing tokens; only the result carrying the latest token is current.
///
/// Clones share the counter, so a tracker can be handed to whatever completes requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationTracker {
    latest: Arc<AtomicU64>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request. Any token issued earlier becomes stale.
    pub fn issue(&self) -> GenerationToken {
        GenerationToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: GenerationToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Returns `result` if `token` is still current, `None` for a stale arrival.
    pub fn accept<T>(&self, token: GenerationToken, result: T) -> Option<T> {
        if self.is_current(token) {
            Some(result)
        } else {
            tracing::debug!(
                token = token.0,
                latest = self.latest.load(Ordering::SeqCst),
                "discarding stale generation result"
            );
            None
        }
    }
}
