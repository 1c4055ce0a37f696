//! Subject types for ability checks
//!
//! Rule matching needs a nominal type for every record it inspects. Each
//! domain entity converts into a lightweight tagged view carrying only the
//! fields conditions read, so a type-level query and an instance query
//! resolve to the same [`SubjectKind`].

use uuid::Uuid;

use crate::domain::entities::user::{User, UserRole};

/// Subject type tag used for rule matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    User,
    Tournament,
}

/// View of a user record as an ability subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub role: UserRole,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// View of a tournament record as an ability subject.
///
/// Tournament persistence lives outside this core; the engine only needs
/// the type tag and identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentRef {
    pub id: Uuid,
}

/// A concrete subject instance presented to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    User(UserRef),
    Tournament(TournamentRef),
}

impl Subject {
    /// The type tag this instance matches rules under
    pub fn kind(&self) -> SubjectKind {
        match self {
            Subject::User(_) => SubjectKind::User,
            Subject::Tournament(_) => SubjectKind::Tournament,
        }
    }
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Subject::User(UserRef::from(user))
    }
}

impl From<UserRef> for Subject {
    fn from(user: UserRef) -> Self {
        Subject::User(user)
    }
}

impl From<TournamentRef> for Subject {
    fn from(tournament: TournamentRef) -> Self {
        Subject::Tournament(tournament)
    }
}
