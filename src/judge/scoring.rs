/// Outcome of the scoring decision for one judged submission.
///
/// `scored` is the value the attempt's `scored` flag must hold afterwards and
/// `points_awarded` is the delta to add to the user's aggregate score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDecision {
    pub scored: bool,
    pub points_awarded: i32,
}

/// Decides whether `points` are awarded for a submission.
///
/// Points are granted only on the first passing run: once `already_scored` is
/// set, the decision stays `scored` and awards nothing.
pub fn decide(already_scored: bool, points: i32, passed: bool) -> ScoreDecision {
    match (already_scored, passed) {
        (true, _) => ScoreDecision {
            scored: true,
            points_awarded: 0,
        },
        (false, true) => ScoreDecision {
            scored: true,
            points_awarded: points,
        },
        (false, false) => ScoreDecision {
            scored: false,
            points_awarded: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pass_awards_points() {
        let decision = decide(false, 10, true);
        assert!(decision.scored);
        assert_eq!(decision.points_awarded, 10);
    }

    #[test]
    fn failure_awards_nothing() {
        let decision = decide(false, 10, false);
        assert!(!decision.scored);
        assert_eq!(decision.points_awarded, 0);
    }

    #[test]
    fn already_scored_is_idempotent() {
        let passing = decide(true, 10, true);
        assert!(passing.scored);
        assert_eq!(passing.points_awarded, 0);

        let failing = decide(true, 10, false);
        assert!(failing.scored);
        assert_eq!(failing.points_awarded, 0);
    }
}
