use crate::schema::{user_exercises, users};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub score: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    // score has a DB default (0)
}

/// The latest judged attempt of one user at one exercise.
#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = user_exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserExercise {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub code: String,
    pub time: Option<BigDecimal>,
    pub status: bool,
    pub scored: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_exercises)]
pub struct NewUserExercise {
    pub user_id: i64,
    pub exercise_id: i64,
    pub code: String,
    pub time: Option<BigDecimal>,
    pub status: bool,
    pub scored: bool,
    // updated_at has a DB default (CURRENT_TIMESTAMP)
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AttemptView {
    pub code: String,
    pub time: Option<BigDecimal>,
    pub status: bool,
    pub scored: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<UserExercise> for AttemptView {
    fn from(attempt: UserExercise) -> Self {
        AttemptView {
            code: attempt.code,
            time: attempt.time,
            status: attempt.status,
            scored: attempt.scored,
            updated_at: attempt.updated_at,
        }
    }
}
