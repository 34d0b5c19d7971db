use super::{AttemptRecord, JudgeStore, RecordedAttempt, StoreError, settle_decision};
use crate::model::{
    Exercise, ExpectedOutput, NewExercise, NewTestCaseExercise, NewUser, TestCaseExercise, User,
    UserExercise,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    exercises: BTreeMap<i64, Exercise>,
    test_cases: BTreeMap<i64, TestCaseExercise>,
    user_exercises: HashMap<(i64, i64), UserExercise>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Process-local store with the same semantics as [`super::PgStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JudgeStore for MemoryStore {
    async fn list_exercises(&self, include_deprecated: bool) -> Result<Vec<Exercise>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exercises
            .values()
            .filter(|exercise| include_deprecated || !exercise.deprecated)
            .cloned()
            .collect())
    }

    async fn find_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>, StoreError> {
        Ok(self.tables.read().await.exercises.get(&exercise_id).cloned())
    }

    async fn test_cases(&self, exercise_id: i64) -> Result<Vec<TestCaseExercise>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .test_cases
            .values()
            .filter(|case| case.exercise_id == exercise_id)
            .cloned()
            .collect())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&user_id).cloned())
    }

    async fn find_user_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<UserExercise>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.user_exercises.get(&(user_id, exercise_id)).cloned())
    }

    async fn record_attempt(&self, record: AttemptRecord) -> Result<RecordedAttempt, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(current_score) = tables.users.get(&record.user_id).map(|user| user.score) else {
            return Err(StoreError::NotFound(format!(
                "User with ID {}",
                record.user_id
            )));
        };

        let key = (record.user_id, record.exercise_id);
        let previous = tables.user_exercises.get(&key).cloned();
        let previously_scored = previous.as_ref().is_some_and(|attempt| attempt.scored);
        let decision = settle_decision(previously_scored, record.decision);

        // nothing is written when the new total does not fit
        let new_score = current_score
            .checked_add(decision.points_awarded)
            .ok_or(StoreError::ScoreOverflow {
                user_id: record.user_id,
            })?;

        let id = match previous {
            Some(attempt) => attempt.id,
            None => tables.next_id(),
        };
        let user_exercise = UserExercise {
            id,
            user_id: record.user_id,
            exercise_id: record.exercise_id,
            code: record.code,
            time: record.time,
            status: record.status,
            scored: decision.scored,
            updated_at: Utc::now(),
        };
        tables.user_exercises.insert(key, user_exercise.clone());

        if let Some(user) = tables.users.get_mut(&record.user_id) {
            user.score = new_score;
        }

        info!(
            "Recorded attempt {} for user {} on exercise {} (status: {}, scored: {}, awarded: {})",
            user_exercise.id,
            record.user_id,
            record.exercise_id,
            user_exercise.status,
            user_exercise.scored,
            decision.points_awarded
        );
        Ok(RecordedAttempt {
            user_exercise,
            points_awarded: decision.points_awarded,
        })
    }

    async fn create_exercise(
        &self,
        exercise: NewExercise,
        test_cases: Vec<NewTestCaseExercise>,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;

        // resolve every expected output before touching the tables
        let mut resolved = Vec::with_capacity(test_cases.len());
        for case in test_cases {
            let expected_output = ExpectedOutput::from_json(case.expected_output)
                .map_err(|source| StoreError::CorruptTestCase { id: 0, source })?;
            resolved.push((case.input, expected_output));
        }

        let exercise_id = tables.next_id();
        tables.exercises.insert(
            exercise_id,
            Exercise {
                id: exercise_id,
                title: exercise.title,
                category: exercise.category,
                statement: exercise.statement,
                score: exercise.score,
                deprecated: exercise.deprecated,
                created_at: Utc::now(),
            },
        );

        for (input, expected_output) in resolved {
            let id = tables.next_id();
            tables.test_cases.insert(
                id,
                TestCaseExercise {
                    id,
                    exercise_id,
                    input,
                    expected_output,
                },
            );
        }

        Ok(exercise_id)
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.users.insert(
            id,
            User {
                id,
                username: user.username,
                email: user.email,
                score: 0,
            },
        );
        Ok(id)
    }
}
