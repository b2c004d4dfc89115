//! Capability backends — the seam between the pipeline and the generative model.
//!
//! `AppState` wiring picks the backend at startup: `LlmBackend` for live runs,
//! `OfflineBackend` when `OFFLINE_MODE` is set. Everything downstream of these
//! traits is model-agnostic.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::enhance::prompts::{ENHANCEMENT_SYSTEM, GRADING_SYSTEM, ROLE_PROMPT_TEMPLATE};
use crate::llm_client::{LlmClient, LlmError};
use crate::pdf::{Document, MEDIA_TYPE};

/// Output of one generation call: a free-text rationale plus an optional
/// document revision. `None` means the document passes through unchanged.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub rationale: String,
    pub revision: Option<Bytes>,
}

/// Content-generation capability: given a role label and a document, return
/// a rationale and (optionally) revised document bytes.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn propose(
        &self,
        identity: &str,
        document: &Document,
    ) -> Result<GenerationOutput, LlmError>;
}

/// Evaluative capability: given a labeled enumeration of rationales, return
/// free text containing a recoverable selection label.
#[async_trait]
pub trait EvaluationBackend: Send + Sync {
    async fn evaluate(&self, prompt: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmBackend — live capability via the Claude API
// ────────────────────────────────────────────────────────────────────────────

/// Live backend. The document rides along as a base64 document block.
pub struct LlmBackend {
    llm: LlmClient,
}

impl LlmBackend {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl GenerationBackend for LlmBackend {
    async fn propose(
        &self,
        identity: &str,
        document: &Document,
    ) -> Result<GenerationOutput, LlmError> {
        let prompt = ROLE_PROMPT_TEMPLATE.replace("{identity}", identity);
        let response = self
            .llm
            .call_with_document(&prompt, ENHANCEMENT_SYSTEM, document.as_bytes(), MEDIA_TYPE)
            .await?;
        let rationale = response.text().ok_or(LlmError::EmptyContent)?.to_string();
        debug!("{identity}: received {} chars of rationale", rationale.len());

        // The Messages API returns prose only; the revised document stays None
        // and the input passes through unchanged.
        Ok(GenerationOutput {
            rationale,
            revision: None,
        })
    }
}

#[async_trait]
impl EvaluationBackend for LlmBackend {
    async fn evaluate(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.llm.call(prompt, GRADING_SYSTEM).await?;
        Ok(response.text().ok_or(LlmError::EmptyContent)?.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OfflineBackend — degraded local variant, no network
// ────────────────────────────────────────────────────────────────────────────

/// Degraded backend: deterministic canned output, document passes through
/// unchanged. Lets the full pipeline run without credentials.
pub struct OfflineBackend;

#[async_trait]
impl GenerationBackend for OfflineBackend {
    async fn propose(
        &self,
        identity: &str,
        document: &Document,
    ) -> Result<GenerationOutput, LlmError> {
        Ok(GenerationOutput {
            rationale: format!(
                "{identity} (offline) reviewed the {}-page resume: tighten the summary, \
                quantify achievements, and keep formatting consistent across sections.",
                document.page_count()
            ),
            revision: None,
        })
    }
}

#[async_trait]
impl EvaluationBackend for OfflineBackend {
    async fn evaluate(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok("Version 1: chosen by offline policy; the first agent's review stands.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::sample_document;

    #[tokio::test]
    async fn test_offline_rationale_names_the_agent() {
        let document = sample_document();
        let output = OfflineBackend
            .propose("Agent 2", &document)
            .await
            .unwrap();
        assert!(output.rationale.contains("Agent 2"));
        assert!(output.revision.is_none());
    }

    #[tokio::test]
    async fn test_offline_evaluation_labels_version_one() {
        let reply = OfflineBackend.evaluate("ignored").await.unwrap();
        assert!(reply.contains("Version 1"));
    }
}
