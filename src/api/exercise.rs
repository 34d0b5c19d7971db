use crate::AppState;
use crate::errors::AppError;
use crate::judge::{self, JudgeError};
use crate::model::{AttemptView, ExerciseDetailResponse, ExerciseSummary};
use crate::payloads::{ProcessExerciseForm, ShowExerciseParams};
use crate::response::ApiResponse;
use crate::store::StoreError;
use axum::extract::{Form, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error, info, instrument, warn};

/// Value of the `judge` query parameter when the execution service failed.
pub const JUDGE_UNAVAILABLE: &str = "unavailable";
/// Value of the `judge` query parameter when the exercise has no test cases.
pub const JUDGE_UNGRADABLE: &str = "ungradable";
/// Value of the `judge` query parameter when the attempt could not be stored.
pub const JUDGE_ERROR: &str = "error";

fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Lists exercises that are not deprecated.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<ExerciseSummary>` ordered by id (200)
/// * `None` if failed (500)
#[instrument(skip(state))]
pub async fn list_exercises_not_deprecated(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ExerciseSummary>>, AppError> {
    info!("Fetching active exercises");

    let exercises = state.store.list_exercises(false).await?;

    info!("Successfully fetched {} active exercises", exercises.len());
    Ok(ApiResponse::ok(
        exercises.into_iter().map(ExerciseSummary::from).collect(),
    ))
}

/// Lists every exercise, deprecated ones included.
///
/// Returns (wrapped in `ApiResponse`)
/// * `Vec<ExerciseSummary>` ordered by id (200)
/// * `None` if failed (500)
#[instrument(skip(state))]
pub async fn list_all_exercises(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ExerciseSummary>>, AppError> {
    info!("Fetching all exercises");

    let exercises = state.store.list_exercises(true).await?;

    info!("Successfully fetched {} exercises", exercises.len());
    Ok(ApiResponse::ok(
        exercises.into_iter().map(ExerciseSummary::from).collect(),
    ))
}

/// Shows an exercise and, when `user_id` is given, that user's last attempt.
///
/// Expected outputs of the test cases are never exposed.
///
/// Parameters
/// * exercise_id as `i64` (path)
/// * user_id as `Option<i64>` (query)
///
/// Returns (wrapped in `ApiResponse`)
/// * `ExerciseDetailResponse` if succeeded (200)
/// * `None` if the exercise does not exist (404)
/// * `None` if failed (500)
#[instrument(skip(state, params))]
pub async fn show_exercise(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Query(params): Query<ShowExerciseParams>,
) -> Result<ApiResponse<ExerciseDetailResponse>, AppError> {
    info!("Fetching exercise_id: {}", exercise_id);
    debug!("Show exercise params: {:?}", params);

    let exercise = state
        .store
        .find_exercise(exercise_id)
        .await?
        .ok_or_else(|| {
            warn!("Exercise {} not found", exercise_id);
            AppError::NotFound(format!("Exercise with ID {} not found", exercise_id))
        })?;

    let test_case_count = state.store.test_cases(exercise_id).await?.len();

    let attempt = match params.user_id {
        Some(user_id) => state
            .store
            .find_user_exercise(user_id, exercise_id)
            .await?
            .map(AttemptView::from),
        None => None,
    };

    Ok(ApiResponse::ok(ExerciseDetailResponse {
        id: exercise.id,
        title: exercise.title,
        category: exercise.category,
        statement: exercise.statement,
        score: exercise.score,
        deprecated: exercise.deprecated,
        test_case_count,
        attempt,
    }))
}

/// Judges a submitted solution and redirects back to the exercise page.
///
/// Parameters
/// * exercise_id as `i64` (path)
/// * user_id as `i64`, code as `String` (form)
///
/// Returns
/// * 302 to the exercise page whether the submission passed, failed or was blank
/// * 302 with `judge=ungradable` if the exercise has no test cases
/// * 302 with `judge=unavailable` if the execution service failed
/// * 302 with `judge=error` if reading or storing the attempt failed
/// * `None` if the exercise or user does not exist (404, wrapped in `ApiResponse`)
#[instrument(skip(state, form))]
pub async fn process_user_exercise(
    State(state): State<AppState>,
    Path(exercise_id): Path<i64>,
    Form(form): Form<ProcessExerciseForm>,
) -> Result<Response, AppError> {
    info!(
        "Processing submission for exercise_id: {}, user_id: {}",
        exercise_id, form.user_id
    );

    let location = state.exercise_detail_path(exercise_id);

    let outcome = judge::judge_submission(
        state.store.as_ref(),
        state.executor.as_ref(),
        form.user_id,
        exercise_id,
        &form.code,
    )
    .await;

    match outcome {
        Ok(judgement) => {
            info!(
                "Submission {} for exercise {} finished (passed: {}, awarded: {})",
                judgement.id, exercise_id, judgement.passed, judgement.points_awarded
            );
            Ok(redirect(&location))
        }
        Err(JudgeError::EmptyCode) => {
            info!("Blank code submitted for exercise {}", exercise_id);
            Ok(redirect(&location))
        }
        Err(JudgeError::NoTestCases(_)) => {
            warn!("Exercise {} cannot be judged without test cases", exercise_id);
            Ok(redirect(&format!("{}?judge={}", location, JUDGE_UNGRADABLE)))
        }
        Err(JudgeError::ExecutionService(err)) => {
            error!(
                "Execution service failed while judging exercise {}: {:?}",
                exercise_id, err
            );
            Ok(redirect(&format!("{}?judge={}", location, JUDGE_UNAVAILABLE)))
        }
        Err(JudgeError::ExerciseNotFound(id)) => {
            warn!("Exercise {} not found", id);
            Err(AppError::NotFound(format!("Exercise with ID {} not found", id)))
        }
        Err(JudgeError::UserNotFound(id)) => {
            warn!("User {} not found", id);
            Err(AppError::NotFound(format!("User with ID {} not found", id)))
        }
        Err(JudgeError::Store(StoreError::NotFound(what))) => {
            warn!("{} vanished while judging exercise {}", what, exercise_id);
            Err(AppError::NotFound(format!("{} not found", what)))
        }
        Err(JudgeError::Store(err)) => {
            error!(
                "Store failed while judging exercise {}: {:?}",
                exercise_id, err
            );
            Ok(redirect(&format!("{}?judge={}", location, JUDGE_ERROR)))
        }
    }
}
