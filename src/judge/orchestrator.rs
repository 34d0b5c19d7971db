use crate::judge::executor::{CodeExecutor, ExecutionError};
use crate::judge::{comparator, extractor, scoring};
use crate::model::UserExercise;
use crate::store::{AttemptRecord, JudgeStore, StoreError};
use bigdecimal::BigDecimal;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("submitted code is blank")]
    EmptyCode,

    #[error("exercise {0} not found")]
    ExerciseNotFound(i64),

    #[error("user {0} not found")]
    UserNotFound(i64),

    #[error("exercise {0} has no test cases and cannot be judged")]
    NoTestCases(i64),

    #[error("execution service failed")]
    ExecutionService(#[from] ExecutionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of running the submission on one test case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub test_case_id: i64,
    pub passed: bool,
    pub time: Option<BigDecimal>,
    pub compile_errors: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Judgement {
    pub id: Uuid,
    pub passed: bool,
    pub points_awarded: i32,
    pub cases: Vec<CaseOutcome>,
    pub attempt: UserExercise,
}

/// Judges `code` for `user_id` against every test case of `exercise_id`.
///
/// Test cases run sequentially and all of them run; the submission passes
/// only if every case passes. Nothing is persisted when the code is blank,
/// the exercise has no test cases, or the execution service fails.
#[instrument(skip(store, executor, code), fields(judgement_id = tracing::field::Empty))]
pub async fn judge_submission(
    store: &dyn JudgeStore,
    executor: &dyn CodeExecutor,
    user_id: i64,
    exercise_id: i64,
    code: &str,
) -> Result<Judgement, JudgeError> {
    if code.trim().is_empty() {
        info!("Rejecting blank submission for exercise {}", exercise_id);
        return Err(JudgeError::EmptyCode);
    }

    let judgement_id = Uuid::new_v4();
    tracing::Span::current().record("judgement_id", tracing::field::display(judgement_id));

    let exercise = store
        .find_exercise(exercise_id)
        .await?
        .ok_or(JudgeError::ExerciseNotFound(exercise_id))?;
    store
        .find_user(user_id)
        .await?
        .ok_or(JudgeError::UserNotFound(user_id))?;

    let test_cases = store.test_cases(exercise_id).await?;
    if test_cases.is_empty() {
        warn!("Exercise {} has no test cases, cannot judge", exercise_id);
        return Err(JudgeError::NoTestCases(exercise_id));
    }

    let already_scored = store
        .find_user_exercise(user_id, exercise_id)
        .await?
        .is_some_and(|attempt| attempt.scored);

    info!(
        "Judging submission {} of user {} on exercise {} against {} test case(s)",
        judgement_id,
        user_id,
        exercise_id,
        test_cases.len()
    );

    let mut cases = Vec::with_capacity(test_cases.len());
    for case in &test_cases {
        let raw = executor.execute(code, &case.input).await?;

        let stdout = extractor::extract_stdout(&raw);
        let passed = comparator::matches(stdout.as_deref(), &case.expected_output);
        let outcome = CaseOutcome {
            test_case_id: case.id,
            passed,
            time: extractor::extract_time(&raw),
            compile_errors: extractor::extract_compile_errors(&raw),
        };
        debug!(
            "Test case {}: passed={}, time={:?}, compile_errors={:?}, stderr={:?}",
            case.id,
            outcome.passed,
            outcome.time,
            outcome.compile_errors,
            extractor::extract_stderr(&raw)
        );
        cases.push(outcome);
    }

    let passed = cases.iter().all(|case| case.passed);
    let last_time = cases.last().and_then(|case| case.time.clone());
    let decision = scoring::decide(already_scored, exercise.score, passed);

    let recorded = store
        .record_attempt(AttemptRecord {
            user_id,
            exercise_id,
            code: code.to_string(),
            time: last_time,
            status: passed,
            decision,
        })
        .await?;

    info!(
        "Submission {} judged: passed={}, points awarded={}",
        judgement_id, passed, recorded.points_awarded
    );
    Ok(Judgement {
        id: judgement_id,
        passed,
        points_awarded: recorded.points_awarded,
        cases,
        attempt: recorded.user_exercise,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::executor::RawExecution;
    use crate::model::{ExpectedOutput, NewExercise, NewTestCaseExercise, NewUser};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Prints `output` whatever the input, and counts its runs.
    struct FixedOutput {
        output: &'static str,
        runs: AtomicUsize,
    }

    impl FixedOutput {
        fn new(output: &'static str) -> Self {
            FixedOutput {
                output,
                runs: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CodeExecutor for FixedOutput {
        async fn execute(&self, _source: &str, _stdin: &str) -> Result<RawExecution, ExecutionError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(RawExecution(json!({
                "compile_status": "OK",
                "run_status": { "time_used": "0.1", "output": self.output }
            })))
        }
    }

    async fn seed(store: &MemoryStore, cases: Vec<(&str, ExpectedOutput)>) -> (i64, i64) {
        let user_id = store
            .create_user(NewUser {
                username: "Username".to_string(),
                email: "user@user.com".to_string(),
            })
            .await
            .unwrap();
        let test_cases = cases
            .into_iter()
            .map(|(input, expected)| NewTestCaseExercise::new(0, input, &expected))
            .collect();
        let exercise_id = store
            .create_exercise(
                NewExercise {
                    title: "Basic Exercise".to_string(),
                    category: 2,
                    statement: "<p>Text Basic Exercise.</p>".to_string(),
                    score: 10,
                    deprecated: false,
                },
                test_cases,
            )
            .await
            .unwrap();
        (user_id, exercise_id)
    }

    #[tokio::test]
    async fn blank_code_never_reaches_executor() {
        let store = MemoryStore::new();
        let (user_id, exercise_id) = seed(&store, vec![("a\n", ExpectedOutput::from("B"))]).await;
        let executor = FixedOutput::new("B");

        let result = judge_submission(&store, &executor, user_id, exercise_id, "  \n\t").await;

        assert!(matches!(result, Err(JudgeError::EmptyCode)));
        assert_eq!(executor.runs.load(Ordering::SeqCst), 0);
        assert!(
            store
                .find_user_exercise(user_id, exercise_id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn every_case_runs_even_after_a_failure() {
        let store = MemoryStore::new();
        let (user_id, exercise_id) = seed(
            &store,
            vec![
                ("1\n", ExpectedOutput::from("A")),
                ("2\n", ExpectedOutput::from("B")),
                ("3\n", ExpectedOutput::from("B")),
            ],
        )
        .await;
        let executor = FixedOutput::new("B");

        let judgement = judge_submission(&store, &executor, user_id, exercise_id, "code")
            .await
            .unwrap();

        assert_eq!(executor.runs.load(Ordering::SeqCst), 3);
        assert!(!judgement.passed);
        assert_eq!(
            judgement.cases.iter().map(|c| c.passed).collect::<Vec<_>>(),
            vec![false, true, true]
        );
        assert!(!judgement.attempt.status);
        assert!(!judgement.attempt.scored);
    }

    #[tokio::test]
    async fn no_test_cases_is_ungradable() {
        let store = MemoryStore::new();
        let (user_id, exercise_id) = seed(&store, vec![]).await;
        let executor = FixedOutput::new("B");

        let result = judge_submission(&store, &executor, user_id, exercise_id, "code").await;

        assert!(matches!(result, Err(JudgeError::NoTestCases(id)) if id == exercise_id));
        assert_eq!(executor.runs.load(Ordering::SeqCst), 0);
        assert!(
            store
                .find_user_exercise(user_id, exercise_id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
