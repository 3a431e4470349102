use std::fmt;

use serde::{Deserialize, Serialize};

const SHIFT: &str = "SHIFT";
const COMPLETE: &str = "COMPLETE";
const BUILD_PREFIX: &str = "BUILD-";

/// A transition of the shift-reduce system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Push the next buffer item.
    Shift,
    /// Start a constituent with the completed top item as its first child.
    Build(String),
    /// Close the innermost open constituent over the items above it.
    Complete,
}

impl Action {
    /// Read a classifier outcome. Unknown outcomes yield `None`.
    pub fn from_outcome(outcome: &str) -> Option<Self> {
        match outcome {
            SHIFT => Some(Self::Shift),
            COMPLETE => Some(Self::Complete),
            _ => outcome
                .strip_prefix(BUILD_PREFIX)
                .filter(|label| !label.is_empty())
                .map(|label| Self::Build(label.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift => f.write_str(SHIFT),
            Self::Build(label) => write!(f, "{BUILD_PREFIX}{label}"),
            Self::Complete => f.write_str(COMPLETE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_strings() {
        for action in [Action::Shift, Action::Complete, Action::Build("NP".into())] {
            assert_eq!(Action::from_outcome(&action.to_string()), Some(action));
        }
        assert_eq!(
            Action::from_outcome("BUILD-grup.nom"),
            Some(Action::Build("grup.nom".into()))
        );
        assert_eq!(Action::from_outcome("BUILD-"), None);
        assert_eq!(Action::from_outcome("B-NP"), None);
    }
}
