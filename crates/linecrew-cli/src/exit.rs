//! Process exit codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: assignment found, or command completed |
//! | 1 | Failure: malformed input, IO or configuration error |
//! | 2 | Infeasible: no assignment satisfies the rules |
//! | 3 | Exhausted: search budget ran out before an answer |

use std::process;

use linecrew_core::SolveOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    Infeasible = 2,
    Exhausted = 3,
}

impl ExitCode {
    pub fn from_outcome(outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Feasible(_) => ExitCode::Success,
            SolveOutcome::Infeasible(_) => ExitCode::Infeasible,
            SolveOutcome::Exhausted(_) => ExitCode::Exhausted,
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecrew_core::{AssignmentResult, Infeasibility, LimitHit};

    #[test]
    fn outcome_codes() {
        assert_eq!(
            ExitCode::from_outcome(&SolveOutcome::Feasible(AssignmentResult::default())).code(),
            0
        );
        assert_eq!(
            ExitCode::from_outcome(&SolveOutcome::Infeasible(Infeasibility::default())).code(),
            2
        );
        assert_eq!(
            ExitCode::from_outcome(&SolveOutcome::Exhausted(LimitHit::Backtracks(5))).code(),
            3
        );
        assert_eq!(ExitCode::Failure.code(), 1);
    }
}
