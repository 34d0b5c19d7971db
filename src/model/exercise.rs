use crate::model::submission::AttemptView;
use crate::schema::{exercises, test_case_exercises};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Queryable, Selectable, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[diesel(table_name = exercises)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Exercise {
    pub id: i64,
    pub title: String,
    pub category: i32,
    pub statement: String,
    pub score: i32,
    pub deprecated: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Serialize, Debug, Clone)]
#[diesel(table_name = exercises)]
pub struct NewExercise {
    pub title: String,
    pub category: i32,
    pub statement: String,
    pub score: i32,
    pub deprecated: bool,
    // created_at has a DB default (CURRENT_TIMESTAMP)
}

/// What a test case accepts as program output.
///
/// Stored as JSON: a string is an exact match, an array lists every accepted
/// output. Older exercises only ever used the string form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExpectedOutput {
    Exact(String),
    AnyOf(Vec<String>),
}

impl ExpectedOutput {
    pub fn from_json(value: JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            ExpectedOutput::Exact(text) => JsonValue::String(text.clone()),
            ExpectedOutput::AnyOf(variants) => JsonValue::Array(
                variants
                    .iter()
                    .cloned()
                    .map(JsonValue::String)
                    .collect(),
            ),
        }
    }

    /// An empty acceptance list can never be matched.
    pub fn is_satisfiable(&self) -> bool {
        !matches!(self, ExpectedOutput::AnyOf(variants) if variants.is_empty())
    }
}

impl From<&str> for ExpectedOutput {
    fn from(text: &str) -> Self {
        ExpectedOutput::Exact(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseExercise {
    pub id: i64,
    pub exercise_id: i64,
    pub input: String,
    pub expected_output: ExpectedOutput,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = test_case_exercises)]
pub struct NewTestCaseExercise {
    pub exercise_id: i64,
    pub input: String,
    pub expected_output: JsonValue,
}

impl NewTestCaseExercise {
    pub fn new(exercise_id: i64, input: impl Into<String>, expected: &ExpectedOutput) -> Self {
        NewTestCaseExercise {
            exercise_id,
            input: input.into(),
            expected_output: expected.to_json(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub id: i64,
    pub title: String,
    pub category: i32,
    pub score: i32,
    pub deprecated: bool,
}

impl From<Exercise> for ExerciseSummary {
    fn from(exercise: Exercise) -> Self {
        ExerciseSummary {
            id: exercise.id,
            title: exercise.title,
            category: exercise.category,
            score: exercise.score,
            deprecated: exercise.deprecated,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ExerciseDetailResponse {
    pub id: i64,
    pub title: String,
    pub category: i32,
    pub statement: String,
    pub score: i32,
    pub deprecated: bool,
    // calculated fields
    pub test_case_count: usize,
    pub attempt: Option<AttemptView>,
}
