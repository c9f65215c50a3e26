use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryState {
    Received,
    Classified,
    Dispatched,
    Evaluated,
    Assembled,
}

impl QueryState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Classified => "classified",
            Self::Dispatched => "dispatched",
            Self::Evaluated => "evaluated",
            Self::Assembled => "assembled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Assembled
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryEvent {
    Classified,
    Dispatched,
    Evaluated,
    Assembled,
    Failed,
}

impl QueryEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classified => "classified",
            Self::Dispatched => "dispatched",
            Self::Evaluated => "evaluated",
            Self::Assembled => "assembled",
            Self::Failed => "failed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: QueryState,
    pub to: QueryState,
    pub event: QueryEvent,
}
