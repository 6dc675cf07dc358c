use serde::{Deserialize, Serialize};

/// One stage of the simulated execution walk-through.
///
/// Declaration order is the canonical plan order; `Ord` follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnimationStep {
    Parse,
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Result,
}

impl AnimationStep {
    pub const CANONICAL: [AnimationStep; 9] = [
        AnimationStep::Parse,
        AnimationStep::Select,
        AnimationStep::From,
        AnimationStep::Join,
        AnimationStep::Where,
        AnimationStep::GroupBy,
        AnimationStep::Having,
        AnimationStep::OrderBy,
        AnimationStep::Result,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnimationStep::Parse => "PARSE",
            AnimationStep::Select => "SELECT",
            AnimationStep::From => "FROM",
            AnimationStep::Join => "JOIN",
            AnimationStep::Where => "WHERE",
            AnimationStep::GroupBy => "GROUP BY",
            AnimationStep::Having => "HAVING",
            AnimationStep::OrderBy => "ORDER BY",
            AnimationStep::Result => "RESULT",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MachineState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// Statement type guessed from the leading keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatementKind {
    #[default]
    Empty,
    Select,
    Insert,
    Update,
    Delete,
    With,
    Other,
}

impl StatementKind {
    pub fn from_keyword(word: &str) -> Self {
        match word.to_ascii_uppercase().as_str() {
            "SELECT" => StatementKind::Select,
            "INSERT" => StatementKind::Insert,
            "UPDATE" => StatementKind::Update,
            "DELETE" => StatementKind::Delete,
            "WITH" => StatementKind::With,
            _ => StatementKind::Other,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
    Natural,
}

/// Where a table reference was first seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOrigin {
    From,
    Join,
}
