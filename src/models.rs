pub mod enums;
pub mod structs;

pub use enums::{AnimationStep, JoinKind, MachineState, StatementKind, TableOrigin};
pub use structs::{JoinClause, ParsedQuery, Position, TableRef, WhereCell};
