/// Session phases. `Aborted` is reachable from every other phase.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    EnteringParticipantId,
    RunningTrial(usize),
    SessionComplete,
    Aborted,
}

impl SessionPhase {
    pub fn is_entry(&self) -> bool {
        matches!(self, SessionPhase::EnteringParticipantId)
    }

    pub fn trial_index(&self) -> Option<usize> {
        match self {
            SessionPhase::RunningTrial(i) => Some(*i),
            _ => None,
        }
    }

    /// Complete or aborted; no further input is accepted.
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionPhase::SessionComplete | SessionPhase::Aborted)
    }

    /// Phase after trial `i` has been confirmed.
    pub fn after_trial(i: usize, total: usize) -> Self {
        if i + 1 < total {
            SessionPhase::RunningTrial(i + 1)
        } else {
            SessionPhase::SessionComplete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_then_completes() {
        assert_eq!(SessionPhase::after_trial(0, 2), SessionPhase::RunningTrial(1));
        assert_eq!(SessionPhase::after_trial(1, 2), SessionPhase::SessionComplete);
        assert!(SessionPhase::SessionComplete.is_finished());
        assert!(SessionPhase::default().is_entry());
    }
}
