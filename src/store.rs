use crate::judge::scoring::ScoreDecision;
use crate::model::{
    Exercise, NewExercise, NewTestCaseExercise, NewUser, TestCaseExercise, User, UserExercise,
};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database pool error")]
    Pool(#[from] deadpool_diesel::postgres::PoolError),

    #[error("database interaction error: {0}")]
    Interact(String),

    #[error("database query error")]
    Diesel(#[from] diesel::result::Error),

    #[error("test case {id} has an unreadable expected output")]
    CorruptTestCase {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("score of user {user_id} would overflow")]
    ScoreOverflow { user_id: i64 },
}

/// Everything the judge writes after running a submission.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub user_id: i64,
    pub exercise_id: i64,
    pub code: String,
    pub time: Option<BigDecimal>,
    pub status: bool,
    pub decision: ScoreDecision,
}

#[derive(Debug, Clone)]
pub struct RecordedAttempt {
    pub user_exercise: UserExercise,
    pub points_awarded: i32,
}

/// Persistence used by the judging pipeline and the HTTP layer.
#[async_trait]
pub trait JudgeStore: Send + Sync {
    async fn list_exercises(&self, include_deprecated: bool) -> Result<Vec<Exercise>, StoreError>;

    async fn find_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>, StoreError>;

    /// Test cases of an exercise, ordered by id.
    async fn test_cases(&self, exercise_id: i64) -> Result<Vec<TestCaseExercise>, StoreError>;

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError>;

    async fn find_user_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<UserExercise>, StoreError>;

    /// Creates or updates the (user, exercise) attempt and applies the score
    /// delta atomically.
    ///
    /// The persisted `scored` flag is re-read under lock: if it is already set,
    /// no points are awarded whatever the decision says, and it is never reset.
    async fn record_attempt(&self, record: AttemptRecord) -> Result<RecordedAttempt, StoreError>;

    /// Inserts an exercise together with its test cases, returning the new id.
    /// `exercise_id` of the given test cases is ignored.
    async fn create_exercise(
        &self,
        exercise: NewExercise,
        test_cases: Vec<NewTestCaseExercise>,
    ) -> Result<i64, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError>;
}

/// Applies the stored `scored` flag on top of a fresh decision.
pub(crate) fn settle_decision(previously_scored: bool, decision: ScoreDecision) -> ScoreDecision {
    if previously_scored {
        ScoreDecision {
            scored: true,
            points_awarded: 0,
        }
    } else {
        decision
    }
}
