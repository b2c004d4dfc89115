//! Grading agent — selects one winning candidate from a completed set.
//!
//! The evaluative capability replies in free text; the winner is recovered
//! from a "Version N" label. An unparsable or out-of-range label falls back
//! to the first candidate. The parser stays behind this module's contract so
//! a structured-output mode can replace it without touching the orchestrator.

use anyhow::anyhow;
use tracing::{debug, warn};

use crate::enhance::agent::Candidate;
use crate::enhance::backend::EvaluationBackend;
use crate::enhance::prompts::GRADING_PROMPT_HEADER;
use crate::errors::AppError;

/// The grading outcome: which candidate won and why.
///
/// `fallback` records that no usable label was found and index 0 was chosen
/// by policy. A genuine "Version 1" choice has `fallback == false`.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub selected: usize,
    pub justification: String,
    pub fallback: bool,
}

/// Grades a complete candidate set down to a single [`Verdict`].
///
/// A single-candidate set wins trivially without calling the evaluative
/// capability. Capability failure is fatal; no justification is fabricated.
pub async fn grade(
    backend: &dyn EvaluationBackend,
    candidates: &[Candidate],
) -> Result<Verdict, AppError> {
    if candidates.is_empty() {
        return Err(AppError::Internal(anyhow!(
            "grading requires at least one candidate"
        )));
    }

    if candidates.len() == 1 {
        debug!(
            "single candidate from {}: trivial selection",
            candidates[0].identity
        );
        return Ok(Verdict {
            selected: 0,
            justification: "Only one candidate was produced; it wins by default.".to_string(),
            fallback: false,
        });
    }

    let prompt = build_grading_prompt(candidates);
    let reply = backend
        .evaluate(&prompt)
        .await
        .map_err(|e| AppError::GradingFailed {
            cause: e.to_string(),
        })?;

    if reply.trim().is_empty() {
        return Err(AppError::GradingFailed {
            cause: "evaluative capability returned empty text".to_string(),
        });
    }

    let (selected, fallback) = match parse_selected_version(&reply, candidates.len()) {
        Some(index) => (index, false),
        None => {
            warn!("grading reply contained no usable version label; defaulting to first candidate");
            (0, true)
        }
    };

    Ok(Verdict {
        selected,
        justification: reply,
        fallback,
    })
}

/// Concatenates all rationales under "Version N" labels for the evaluative
/// capability. Label numbers are one-based; order is dispatch order.
fn build_grading_prompt(candidates: &[Candidate]) -> String {
    let labeled = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Version {}: {}", i + 1, c.rationale))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{GRADING_PROMPT_HEADER}\n\n{labeled}")
}

/// Recovers a zero-based candidate index from a free-text reply.
///
/// Scans for the first "Version" marker followed by an integer token and
/// range-checks the result. Returns None when no marker carries a usable
/// number, which callers resolve via the fallback policy.
fn parse_selected_version(reply: &str, candidate_count: usize) -> Option<usize> {
    let mut search = reply;
    while let Some(pos) = search.find("Version") {
        let after = &search[pos + "Version".len()..];
        let digits: String = after
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if !digits.is_empty() {
            let number: usize = digits.parse().ok()?;
            let index = number.checked_sub(1)?;
            return (index < candidate_count).then_some(index);
        }
        search = after;
    }
    None
}
