use serde::{Deserialize, Serialize};

/// Form posted by the exercise page when a solution is submitted.
#[derive(Deserialize, Serialize, Debug)]
pub struct ProcessExerciseForm {
    pub user_id: i64,
    #[serde(default)]
    pub code: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ShowExerciseParams {
    pub user_id: Option<i64>,
}
