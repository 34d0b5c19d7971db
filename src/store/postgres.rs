use super::{AttemptRecord, JudgeStore, RecordedAttempt, StoreError, settle_decision};
use crate::model::{
    Exercise, ExpectedOutput, NewExercise, NewTestCaseExercise, NewUser, NewUserExercise,
    TestCaseExercise, User, UserExercise,
};
use crate::schema::{
    exercises::dsl as exercises_dsl, test_case_exercises, test_case_exercises::dsl as tce_dsl,
    user_exercises::dsl as ue_dsl, users::dsl as users_dsl,
};
use async_trait::async_trait;
use deadpool_diesel::Runtime;
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::dsl::now;
use diesel::prelude::*;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = test_case_exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct TestCaseRow {
    id: i64,
    exercise_id: i64,
    input: String,
    expected_output: JsonValue,
}

impl TryFrom<TestCaseRow> for TestCaseExercise {
    type Error = StoreError;

    fn try_from(row: TestCaseRow) -> Result<Self, Self::Error> {
        let expected_output = ExpectedOutput::from_json(row.expected_output)
            .map_err(|source| StoreError::CorruptTestCase { id: row.id, source })?;

        Ok(TestCaseExercise {
            id: row.id,
            exercise_id: row.exercise_id,
            input: row.input,
            expected_output,
        })
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        PgStore { pool }
    }

    pub fn connect(conn_str: &str, max_size: u32) -> anyhow::Result<Self> {
        let manager = Manager::new(conn_str, Runtime::Tokio1);
        let pool = Pool::builder(manager).max_size(max_size as usize).build()?;
        Ok(PgStore::new(pool))
    }
}

async fn run_query<T, F>(pool: &Pool, query: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, diesel::result::Error> + Send + 'static,
    T: Send + 'static,
{
    let conn = pool.get().await.map_err(|pool_err| {
        error!(
            "Failed to get DB connection object from pool: {:?}",
            pool_err
        );
        StoreError::Pool(pool_err)
    })?;
    debug!("DB connection object obtained from pool for interaction");

    match conn.interact(query).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(diesel_err)) => {
            error!("Diesel query failed within interaction: {:?}", diesel_err);
            Err(StoreError::Diesel(diesel_err))
        }
        Err(interact_err) => {
            error!("Deadpool interact error: {:?}", interact_err);
            Err(StoreError::Interact(interact_err.to_string()))
        }
    }
}

#[async_trait]
impl JudgeStore for PgStore {
    async fn list_exercises(&self, include_deprecated: bool) -> Result<Vec<Exercise>, StoreError> {
        run_query(&self.pool, move |conn| {
            let mut query = exercises_dsl::exercises
                .select(Exercise::as_select())
                .order(exercises_dsl::id.asc())
                .into_boxed();
            if !include_deprecated {
                query = query.filter(exercises_dsl::deprecated.eq(false));
            }
            query.load(conn)
        })
        .await
    }

    async fn find_exercise(&self, exercise_id: i64) -> Result<Option<Exercise>, StoreError> {
        run_query(&self.pool, move |conn| {
            exercises_dsl::exercises
                .find(exercise_id)
                .select(Exercise::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn test_cases(&self, exercise_id: i64) -> Result<Vec<TestCaseExercise>, StoreError> {
        let rows = run_query(&self.pool, move |conn| {
            tce_dsl::test_case_exercises
                .filter(tce_dsl::exercise_id.eq(exercise_id))
                .order(tce_dsl::id.asc())
                .select(TestCaseRow::as_select())
                .load(conn)
        })
        .await?;

        rows.into_iter().map(TestCaseExercise::try_from).collect()
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        run_query(&self.pool, move |conn| {
            users_dsl::users
                .find(user_id)
                .select(User::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn find_user_exercise(
        &self,
        user_id: i64,
        exercise_id: i64,
    ) -> Result<Option<UserExercise>, StoreError> {
        run_query(&self.pool, move |conn| {
            ue_dsl::user_exercises
                .filter(ue_dsl::user_id.eq(user_id))
                .filter(ue_dsl::exercise_id.eq(exercise_id))
                .select(UserExercise::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn record_attempt(&self, record: AttemptRecord) -> Result<RecordedAttempt, StoreError> {
        let (user_id, exercise_id) = (record.user_id, record.exercise_id);

        let recorded = run_query(&self.pool, move |conn| {
            conn.transaction(|tx| {
                // serialises concurrent attempts of the same user
                users_dsl::users
                    .find(record.user_id)
                    .select(users_dsl::id)
                    .for_update()
                    .first::<i64>(tx)?;

                let previously_scored = ue_dsl::user_exercises
                    .filter(ue_dsl::user_id.eq(record.user_id))
                    .filter(ue_dsl::exercise_id.eq(record.exercise_id))
                    .select(ue_dsl::scored)
                    .for_update()
                    .first::<bool>(tx)
                    .optional()?
                    .unwrap_or(false);

                let decision = settle_decision(previously_scored, record.decision);

                let new_attempt = NewUserExercise {
                    user_id: record.user_id,
                    exercise_id: record.exercise_id,
                    code: record.code,
                    time: record.time,
                    status: record.status,
                    scored: decision.scored,
                };

                let user_exercise = diesel::insert_into(ue_dsl::user_exercises)
                    .values(&new_attempt)
                    .on_conflict((ue_dsl::user_id, ue_dsl::exercise_id))
                    .do_update()
                    .set((
                        ue_dsl::code.eq(new_attempt.code.clone()),
                        ue_dsl::time.eq(new_attempt.time.clone()),
                        ue_dsl::status.eq(new_attempt.status),
                        ue_dsl::scored.eq(new_attempt.scored),
                        ue_dsl::updated_at.eq(now),
                    ))
                    .returning(UserExercise::as_returning())
                    .get_result(tx)?;

                if decision.points_awarded > 0 {
                    diesel::update(users_dsl::users.find(record.user_id))
                        .set(users_dsl::score.eq(users_dsl::score + decision.points_awarded))
                        .execute(tx)?;
                }

                Ok(RecordedAttempt {
                    user_exercise,
                    points_awarded: decision.points_awarded,
                })
            })
        })
        .await
        .map_err(|err| match err {
            StoreError::Diesel(diesel::result::Error::NotFound) => {
                StoreError::NotFound(format!("User with ID {}", user_id))
            }
            other => other,
        })?;

        info!(
            "Recorded attempt {} for user {} on exercise {} (status: {}, scored: {}, awarded: {})",
            recorded.user_exercise.id,
            user_id,
            exercise_id,
            recorded.user_exercise.status,
            recorded.user_exercise.scored,
            recorded.points_awarded
        );
        Ok(recorded)
    }

    async fn create_exercise(
        &self,
        exercise: NewExercise,
        test_cases: Vec<NewTestCaseExercise>,
    ) -> Result<i64, StoreError> {
        run_query(&self.pool, move |conn| {
            conn.transaction(|tx| {
                let exercise_id = diesel::insert_into(exercises_dsl::exercises)
                    .values(&exercise)
                    .returning(exercises_dsl::id)
                    .get_result::<i64>(tx)?;

                let test_cases: Vec<NewTestCaseExercise> = test_cases
                    .into_iter()
                    .map(|case| NewTestCaseExercise {
                        exercise_id,
                        ..case
                    })
                    .collect();

                if !test_cases.is_empty() {
                    diesel::insert_into(tce_dsl::test_case_exercises)
                        .values(&test_cases)
                        .execute(tx)?;
                }

                Ok(exercise_id)
            })
        })
        .await
    }

    async fn create_user(&self, user: NewUser) -> Result<i64, StoreError> {
        run_query(&self.pool, move |conn| {
            diesel::insert_into(users_dsl::users)
                .values(&user)
                .returning(users_dsl::id)
                .get_result::<i64>(conn)
        })
        .await
    }
}
