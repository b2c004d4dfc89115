//! Enhancement agent — one unit of work producing a candidate proposal.

use tracing::debug;

use crate::enhance::backend::GenerationBackend;
use crate::errors::AppError;
use crate::pdf::{self, Document};

/// One agent's proposal: who produced it, the resulting document, and why.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub identity: String,
    pub document: Document,
    pub rationale: String,
}

/// Runs a single enhancement agent against `document`.
///
/// The input document is never mutated. When the backend returns no revision
/// the candidate carries the input bytes unchanged; when it does, the revision
/// must itself decode as a valid document or the agent fails.
pub async fn enhance(
    backend: &dyn GenerationBackend,
    document: &Document,
    identity: &str,
) -> Result<Candidate, AppError> {
    debug!("{identity}: requesting enhancement proposal");

    let output = backend
        .propose(identity, document)
        .await
        .map_err(|e| AppError::AgentFailed {
            identity: identity.to_string(),
            cause: e.to_string(),
        })?;

    let document = match output.revision {
        Some(revised) => pdf::decode(&revised).map_err(|e| AppError::AgentFailed {
            identity: identity.to_string(),
            cause: format!("returned an invalid document revision: {e}"),
        })?,
        None => document.clone(),
    };

    Ok(Candidate {
        identity: identity.to_string(),
        document,
        rationale: output.rationale,
    })
}
