//! Orchestrator — fans out N enhancement agents over one document, joins the
//! complete candidate set, and grades it down to a single winner.
//!
//! Flow: decode → concurrent agent dispatch → join-all barrier → grade →
//! resolve verdict. A decode failure dispatches nothing; a single agent
//! failure fails the whole run and grading never sees a partial set.

use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinSet;
use tracing::info;
use uuid::Uuid;

use crate::enhance::agent::{self, Candidate};
use crate::enhance::backend::{EvaluationBackend, GenerationBackend};
use crate::enhance::grading;
use crate::errors::AppError;
use crate::pdf::{self, Document};

/// The externally visible outcome of one enhancement run.
#[derive(Debug, Clone)]
pub struct EnhancementResult {
    pub document: Document,
    pub justification: String,
}

/// Coordinates one enhancement run end to end. Constructed once at startup
/// and shared via `AppState`; holds no per-run state.
pub struct Orchestrator {
    generator: Arc<dyn GenerationBackend>,
    evaluator: Arc<dyn EvaluationBackend>,
    fan_out: usize,
}

impl Orchestrator {
    pub fn new(
        generator: Arc<dyn GenerationBackend>,
        evaluator: Arc<dyn EvaluationBackend>,
        fan_out: usize,
    ) -> Self {
        assert!(fan_out >= 1, "fan_out must be at least 1");
        Self {
            generator,
            evaluator,
            fan_out,
        }
    }

    /// Runs the full pipeline over a raw PDF payload.
    ///
    /// No agent or grading call is retried here; re-invoking `run` is the
    /// caller's policy. Dropping the returned future aborts in-flight agent
    /// tasks (the `JoinSet` aborts its tasks on drop) with no side effects.
    pub async fn run(&self, raw: &[u8]) -> Result<EnhancementResult, AppError> {
        let run_id = Uuid::new_v4();
        let document = pdf::decode(raw)?;
        info!(
            "run {run_id}: decoded {}-page resume ({} bytes), dispatching {} agents",
            document.page_count(),
            document.len(),
            self.fan_out
        );

        let candidates = self.dispatch(&document).await?;
        let verdict = grading::grade(self.evaluator.as_ref(), &candidates).await?;

        let winner = &candidates[verdict.selected];
        info!(
            "run {run_id}: '{}' selected{}",
            winner.identity,
            if verdict.fallback {
                " (label fallback)"
            } else {
                ""
            }
        );

        Ok(EnhancementResult {
            document: winner.document.clone(),
            justification: verdict.justification,
        })
    }

    /// Dispatches all agents concurrently and joins the complete set.
    ///
    /// Candidates land in dispatch order regardless of completion order. The
    /// barrier waits for every outcome; when several agents fail, the failure
    /// with the lowest dispatch index surfaces.
    async fn dispatch(&self, document: &Document) -> Result<Vec<Candidate>, AppError> {
        let mut join_set = JoinSet::new();
        for index in 0..self.fan_out {
            let backend = Arc::clone(&self.generator);
            let document = document.clone();
            let identity = format!("Agent {}", index + 1);
            join_set.spawn(async move {
                let outcome = agent::enhance(backend.as_ref(), &document, &identity).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<Candidate, AppError>>> =
            (0..self.fan_out).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            let (index, outcome) =
                joined.map_err(|e| AppError::Internal(anyhow!("agent task panicked: {e}")))?;
            slots[index] = Some(outcome);
        }

        let mut candidates = Vec::with_capacity(self.fan_out);
        for slot in slots {
            let outcome =
                slot.ok_or_else(|| AppError::Internal(anyhow!("agent task vanished from join")))?;
            candidates.push(outcome?);
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::backend::GenerationOutput;
    use crate::llm_client::LlmError;
    use crate::pdf::testing::sample_pdf;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Completes later agents first so completion order is the reverse of
    /// dispatch order.
    struct StaggeredGenerator {
        calls: AtomicUsize,
    }

    impl StaggeredGenerator {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for StaggeredGenerator {
        async fn propose(
            &self,
            identity: &str,
            _document: &Document,
        ) -> Result<GenerationOutput, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let number: u64 = identity.rsplit(' ').next().unwrap().parse().unwrap();
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(number * 10))).await;
            Ok(GenerationOutput {
                rationale: format!("{identity} recommends quantified achievements."),
                revision: None,
            })
        }
    }

    struct FailingGenerator {
        fail_identity: &'static str,
    }

    #[async_trait]
    impl GenerationBackend for FailingGenerator {
        async fn propose(
            &self,
            identity: &str,
            _document: &Document,
        ) -> Result<GenerationOutput, LlmError> {
            if identity == self.fail_identity {
                Err(LlmError::Api {
                    status: 503,
                    message: "network error".to_string(),
                })
            } else {
                Ok(GenerationOutput {
                    rationale: format!("{identity} recommends a skills section."),
                    revision: None,
                })
            }
        }
    }

    struct CountingEvaluator {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl CountingEvaluator {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EvaluationBackend for CountingEvaluator {
        async fn evaluate(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    #[tokio::test]
    async fn test_winner_resolved_by_dispatch_order_not_completion_order() {
        let generator = Arc::new(StaggeredGenerator::new());
        let evaluator = Arc::new(CountingEvaluator::new(
            "I choose Version 2 because it improves clarity.",
        ));
        let orchestrator = Orchestrator::new(generator.clone(), evaluator.clone(), 3);

        let result = orchestrator.run(&sample_pdf(3)).await.unwrap();

        // Version 2 must map to "Agent 2" even though Agent 3 completed first.
        assert!(result.justification.contains("Version 2"));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 1);
        assert!(pdf::validate(result.document.as_bytes()));
    }

    #[tokio::test]
    async fn test_agent_failure_aborts_run_before_grading() {
        let generator = Arc::new(FailingGenerator {
            fail_identity: "Agent 2",
        });
        let evaluator = Arc::new(CountingEvaluator::new("unused"));
        let orchestrator = Orchestrator::new(generator, evaluator.clone(), 3);

        let err = orchestrator.run(&sample_pdf(1)).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::AgentFailed { ref identity, .. } if identity == "Agent 2"
        ));
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_input_dispatches_no_agents() {
        let generator = Arc::new(StaggeredGenerator::new());
        let evaluator = Arc::new(CountingEvaluator::new("unused"));
        let orchestrator = Orchestrator::new(generator.clone(), evaluator, 3);

        let err = orchestrator.run(b"garbage bytes").await.unwrap_err();

        assert!(matches!(err, AppError::MalformedDocument(_)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unparsable_grading_reply_falls_back_to_first_agent() {
        let generator = Arc::new(StaggeredGenerator::new());
        let evaluator = Arc::new(CountingEvaluator::new("No clear winner here."));
        let orchestrator = Orchestrator::new(generator, evaluator, 3);

        let input = sample_pdf(1);
        let result = orchestrator.run(&input).await.unwrap();

        // Fallback winner is Agent 1, whose document is the unchanged input.
        assert_eq!(result.document.as_bytes(), &input[..]);
        assert_eq!(result.justification, "No clear winner here.");
    }

    #[tokio::test]
    async fn test_single_agent_fan_out_skips_evaluation() {
        let generator = Arc::new(StaggeredGenerator::new());
        let evaluator = Arc::new(CountingEvaluator::new("unused"));
        let orchestrator = Orchestrator::new(generator.clone(), evaluator.clone(), 1);

        let result = orchestrator.run(&sample_pdf(1)).await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(evaluator.calls.load(Ordering::SeqCst), 0);
        assert!(!result.justification.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_is_respected() {
        let generator = Arc::new(StaggeredGenerator::new());
        let evaluator = Arc::new(CountingEvaluator::new("Version 5 stands out."));
        let orchestrator = Orchestrator::new(generator.clone(), evaluator, 5);

        orchestrator.run(&sample_pdf(1)).await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
    }
}
