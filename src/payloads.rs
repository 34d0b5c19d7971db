pub mod editor;
pub mod exercise;

pub use editor::{ImportExercisePayload, ImportTestCaseData};
pub use exercise::{ProcessExerciseForm, ShowExerciseParams};
