//! Authorization (ability) engine
//!
//! Builds an immutable per-session rule set from the caller's role and id,
//! then answers `can`/`cannot` queries about actions on subjects. Subjects
//! carry explicit type tags (tagged enums), not magic string properties.

mod engine;
mod subject;


pub use engine::{Ability, AbilityContext, Action, UserField};
pub use subject::{Subject, SubjectKind, TournamentRef, UserRef};
