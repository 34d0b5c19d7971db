use crate::AppState;
use crate::errors::AppError;
use crate::model::{NewExercise, NewTestCaseExercise};
use crate::payloads::ImportExercisePayload;
use crate::response::ApiResponse;
use axum::extract::State;
use axum::response::Json;
use tracing::{debug, info, instrument, warn};

/// Imports an exercise together with its test cases.
///
/// Parameters
/// * `ImportExercisePayload` (JSON)
///
/// Returns (wrapped in `ApiResponse`)
/// * new exercise id as `i64` if succeeded (201)
/// * `None` if the exercise has no test cases or an unmatchable one (400)
/// * `None` if the score is not positive (422)
/// * `None` if failed (500)
#[instrument(skip(state, payload))]
pub async fn import_exercise(
    State(state): State<AppState>,
    Json(payload): Json<ImportExercisePayload>,
) -> Result<ApiResponse<i64>, AppError> {
    info!("Attempting to import exercise '{}'", payload.title);
    debug!("Import exercise payload: {:?}", payload);

    if payload.score <= 0 {
        warn!("Rejecting exercise with non-positive score {}", payload.score);
        return Err(AppError::UnprocessableEntity(format!(
            "Exercise score must be positive, got {}",
            payload.score
        )));
    }

    if payload.test_cases.is_empty() {
        warn!("Rejecting exercise '{}' without test cases", payload.title);
        return Err(AppError::BadRequest(
            "An exercise needs at least one test case".to_string(),
        ));
    }

    if let Some(position) = payload
        .test_cases
        .iter()
        .position(|case| !case.expected_output.is_satisfiable())
    {
        warn!("Test case #{} accepts no output at all", position + 1);
        return Err(AppError::BadRequest(format!(
            "Test case #{} has an empty list of accepted outputs",
            position + 1
        )));
    }

    let new_exercise = NewExercise {
        title: payload.title,
        category: payload.category,
        statement: payload.statement,
        score: payload.score,
        deprecated: payload.deprecated,
    };
    let test_cases = payload
        .test_cases
        .iter()
        .map(|case| NewTestCaseExercise::new(0, case.input.clone(), &case.expected_output))
        .collect::<Vec<_>>();
    let test_case_count = test_cases.len();

    let exercise_id = state
        .store
        .create_exercise(new_exercise, test_cases)
        .await?;

    info!(
        "Imported exercise {} with {} test case(s)",
        exercise_id, test_case_count
    );
    Ok(ApiResponse::created(exercise_id))
}
