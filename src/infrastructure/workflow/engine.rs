//! Step-budgeted workflow graph engine

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::workflow::{
    StepExecutionResult, Transition, WorkflowDefinition, WorkflowError, WorkflowRun,
    WorkflowState, WorkflowStep,
};
use crate::infrastructure::observability::{record_workflow_run, record_workflow_step};

/// Steps allowed per run when not configured otherwise
pub const DEFAULT_STEP_BUDGET: usize = 50;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of steps a run may execute
    pub step_budget: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_budget: DEFAULT_STEP_BUDGET,
        }
    }
}

/// Drives a [`WorkflowDefinition`] from its entry step to a terminal edge
///
/// Steps run strictly one after another. Each partial update is merged into
/// the state before the outgoing edge is resolved. A run that would execute
/// more than `step_budget` steps fails with `RecursionExceeded`.
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn step_budget(&self) -> usize {
        self.config.step_budget
    }

    pub async fn run<W: WorkflowDefinition>(
        &self,
        workflow: &W,
        initial: WorkflowState,
    ) -> Result<WorkflowRun, WorkflowError> {
        let start = Instant::now();
        let result = self.drive(workflow, initial, start).await;

        let outcome = match result {
            Ok(ref run) => {
                info!(
                    workflow = workflow.name(),
                    steps = run.steps.len(),
                    duration_ms = run.execution_time_ms,
                    "Workflow completed"
                );
                "success"
            }
            Err(ref e) => {
                warn!(workflow = workflow.name(), error = %e, "Workflow failed");
                e.kind()
            }
        };
        record_workflow_run(workflow.name(), outcome, start.elapsed());

        result
    }

    async fn drive<W: WorkflowDefinition>(
        &self,
        workflow: &W,
        initial: WorkflowState,
        start: Instant,
    ) -> Result<WorkflowRun, WorkflowError> {
        let mut state = initial;
        let mut steps = Vec::new();
        let mut current = workflow.entry();

        loop {
            if steps.len() >= self.config.step_budget {
                return Err(WorkflowError::recursion_exceeded(
                    workflow.name(),
                    self.config.step_budget,
                ));
            }

            let step_start = Instant::now();
            debug!(workflow = workflow.name(), step = current.name(), "Executing step");

            let update = workflow.execute(current, &state).await?;
            let fields = update.updated_fields();
            state.apply(update);

            let elapsed = step_start.elapsed();
            record_workflow_step(workflow.name(), current.name(), elapsed);
            steps.push(StepExecutionResult::new(
                current.name(),
                &fields,
                elapsed.as_millis() as u64,
            ));

            match workflow.next(current, &state)? {
                Transition::Goto(next) => {
                    debug!(
                        workflow = workflow.name(),
                        from = current.name(),
                        to = next.name(),
                        "Transition"
                    );
                    current = next;
                }
                Transition::End => {
                    return Ok(WorkflowRun {
                        workflow: workflow.name().to_string(),
                        final_state: state,
                        steps,
                        execution_time_ms: start.elapsed().as_millis() as u64,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::domain::grading::BinaryScore;
    use crate::domain::llm::GeneratedContent;
    use crate::domain::workflow::{StateUpdate, WorkflowInput, require_grade};
    use async_trait::async_trait;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum CountStep {
        Draft,
        Check,
    }

    impl WorkflowStep for CountStep {
        fn name(&self) -> &'static str {
            match self {
                Self::Draft => "draft",
                Self::Check => "check",
            }
        }
    }

    /// Drafts, then checks; accepts after `accept_after` drafts
    #[derive(Debug)]
    struct Countdown {
        accept_after: usize,
        fail_on_draft: bool,
        skip_grade: bool,
    }

    impl Countdown {
        fn new(accept_after: usize) -> Self {
            Self {
                accept_after,
                fail_on_draft: false,
                skip_grade: false,
            }
        }

        fn drafts(state: &WorkflowState) -> usize {
            state.question.matches('+').count()
        }
    }

    #[async_trait]
    impl WorkflowDefinition for Countdown {
        type Step = CountStep;

        fn name(&self) -> &'static str {
            "countdown"
        }

        fn entry(&self) -> CountStep {
            CountStep::Draft
        }

        async fn execute(
            &self,
            step: CountStep,
            state: &WorkflowState,
        ) -> Result<StateUpdate, WorkflowError> {
            match step {
                CountStep::Draft if self.fail_on_draft => {
                    Err(DomainError::provider("mock", "unavailable").into())
                }
                CountStep::Draft => Ok(StateUpdate::new()
                    .with_question(format!("{}+", state.question))
                    .with_generation(GeneratedContent::text("draft"))),
                CountStep::Check if self.skip_grade => Ok(StateUpdate::new()),
                CountStep::Check => Ok(StateUpdate::new().with_usefulness(BinaryScore::from(
                    Self::drafts(state) >= self.accept_after,
                ))),
            }
        }

        fn next(
            &self,
            step: CountStep,
            state: &WorkflowState,
        ) -> Result<Transition<CountStep>, WorkflowError> {
            Ok(match step {
                CountStep::Draft => Transition::Goto(CountStep::Check),
                CountStep::Check => {
                    match require_grade(state.usefulness_grade, "usefulness_grade", step)? {
                        BinaryScore::Yes => Transition::End,
                        BinaryScore::No => Transition::Goto(CountStep::Draft),
                    }
                }
            })
        }
    }

    fn initial() -> WorkflowState {
        WorkflowState::from_input(WorkflowInput::new("scope", "q")).unwrap()
    }

    fn engine(budget: usize) -> WorkflowEngine {
        WorkflowEngine::with_config(EngineConfig {
            step_budget: budget,
        })
    }

    #[tokio::test]
    async fn test_run_reaches_end() {
        let run = engine(50).run(&Countdown::new(2), initial()).await.unwrap();

        assert_eq!(run.workflow, "countdown");
        assert_eq!(run.step_names(), vec!["draft", "check", "draft", "check"]);
        assert_eq!(run.final_state.question, "q++");
        assert_eq!(run.final_state.usefulness_grade, Some(BinaryScore::Yes));
        assert_eq!(run.answer(), "draft");
        assert_eq!(run.steps[0].updated_fields, vec!["question", "generation"]);
    }

    #[tokio::test]
    async fn test_budget_allows_exact_fit() {
        let run = engine(4).run(&Countdown::new(2), initial()).await.unwrap();
        assert_eq!(run.steps.len(), 4);
    }

    #[tokio::test]
    async fn test_budget_exceeded() {
        let err = engine(3).run(&Countdown::new(2), initial()).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::RecursionExceeded { ref workflow, budget: 3 } if workflow == "countdown"
        ));
    }

    #[tokio::test]
    async fn test_never_converging_run_is_bounded() {
        let err = WorkflowEngine::new()
            .run(&Countdown::new(usize::MAX), initial())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::RecursionExceeded { budget: DEFAULT_STEP_BUDGET, .. }
        ));
    }

    #[tokio::test]
    async fn test_step_error_propagates_unchanged() {
        let workflow = Countdown {
            fail_on_draft: true,
            ..Countdown::new(1)
        };
        let err = engine(10).run(&workflow, initial()).await.unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Collaborator(DomainError::Provider { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_decision_label_is_configuration_error() {
        let workflow = Countdown {
            skip_grade: true,
            ..Countdown::new(1)
        };
        let err = engine(10).run(&workflow, initial()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration(_)));
    }
}
