use crate::model::ExpectedOutput;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct ImportTestCaseData {
    pub input: String,
    pub expected_output: ExpectedOutput,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ImportExercisePayload {
    pub title: String,
    pub category: i32,
    pub statement: String,
    pub score: i32,
    #[serde(default)]
    pub deprecated: bool,
    pub test_cases: Vec<ImportTestCaseData>,
}
