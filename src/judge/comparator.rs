use crate::model::ExpectedOutput;

/// Returns true iff the produced output is accepted by the test case.
///
/// `Exact` requires byte-for-byte equality, `AnyOf` requires the output to be
/// one of the listed variants. A missing output never matches.
pub fn matches(actual: Option<&str>, expected: &ExpectedOutput) -> bool {
    let Some(actual) = actual else {
        return false;
    };

    match expected {
        ExpectedOutput::Exact(text) => actual == text,
        ExpectedOutput::AnyOf(variants) => variants.iter().any(|variant| variant == actual),
    }
}
