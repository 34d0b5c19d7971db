pub mod exercise;
pub mod submission;

pub use exercise::{
    Exercise, ExerciseDetailResponse, ExerciseSummary, ExpectedOutput, NewExercise,
    NewTestCaseExercise, TestCaseExercise,
};
pub use submission::{AttemptView, NewUser, NewUserExercise, User, UserExercise};
