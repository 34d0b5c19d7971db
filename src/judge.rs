//! Judging pipeline: run a submission on every test case of an exercise,
//! compare outputs, and award the exercise points once.

pub mod comparator;
pub mod executor;
pub mod extractor;
pub mod orchestrator;
pub mod scoring;

pub use executor::{CodeExecutor, ExecutionError, HttpExecutor, HttpExecutorConfig, RawExecution};
pub use orchestrator::{CaseOutcome, JudgeError, Judgement, judge_submission};
pub use scoring::ScoreDecision;
