//! Rule construction and query evaluation

use uuid::Uuid;

use crate::domain::entities::user::UserRole;

use super::subject::{Subject, SubjectKind};

/// Actions the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    ChangeRole,
}

/// User fields that can be targeted by field-scoped rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    FirstName,
    LastName,
    PhoneNumber,
    AlternateNumber,
    Address,
    Email,
    Role,
}

/// Profile fields an account holder (or an admin) may edit. Email and Role
/// are not profile fields.
const PROFILE_FIELDS: &[UserField] = &[
    UserField::FirstName,
    UserField::LastName,
    UserField::PhoneNumber,
    UserField::AlternateNumber,
    UserField::Address,
];

/// Session context the rule set is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityContext {
    pub user_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Allow,
    Deny,
}

/// Condition a rule applies to subject instances.
///
/// Kind-level queries (no instance at hand) treat conditions as satisfiable;
/// instance queries evaluate them against the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    /// Subject must be the caller's own user record
    SelfOnly,
    /// Subject must be a user whose role matches
    TargetRoleIs(UserRole),
}

impl Condition {
    fn matches(&self, context: &AbilityContext, subject: &Subject) -> bool {
        match (self, subject) {
            (Condition::SelfOnly, Subject::User(user)) => user.id == context.user_id,
            (Condition::TargetRoleIs(role), Subject::User(user)) => user.role == *role,
            // Conditions on user attributes never hold for other subjects
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    effect: Effect,
    action: Action,
    subject: SubjectKind,
    /// None means every field (and field-less queries); Some restricts the
    /// rule to the listed fields
    fields: Option<&'static [UserField]>,
    condition: Option<Condition>,
}

impl Rule {
    fn allow(action: Action, subject: SubjectKind) -> Self {
        Self {
            effect: Effect::Allow,
            action,
            subject,
            fields: None,
            condition: None,
        }
    }

    fn deny(action: Action, subject: SubjectKind) -> Self {
        Self {
            effect: Effect::Deny,
            action,
            subject,
            fields: None,
            condition: None,
        }
    }

    fn with_fields(mut self, fields: &'static [UserField]) -> Self {
        self.fields = Some(fields);
        self
    }

    fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    fn matches(
        &self,
        context: &AbilityContext,
        action: Action,
        kind: SubjectKind,
        instance: Option<&Subject>,
        field: Option<UserField>,
    ) -> bool {
        if self.action != action || self.subject != kind {
            return false;
        }

        // Field scope: a field-scoped allow matches a field-less query (some
        // field is covered) and a field query naming one of its fields; a
        // field-scoped deny binds only the fields it names
        if let Some(fields) = self.fields {
            match field {
                Some(field) if !fields.contains(&field) => return false,
                None if self.effect == Effect::Deny => return false,
                _ => {}
            }
        }

        match (&self.condition, instance) {
            (Some(condition), Some(subject)) => condition.matches(context, subject),
            // Kind-level query: a conditioned allow stays in play (some
            // instance could satisfy it); a conditioned deny only binds the
            // instances its condition names, so it cannot deny a whole kind
            (Some(_), None) => self.effect == Effect::Allow,
            (None, _) => true,
        }
    }
}

/// Immutable per-session permission set.
///
/// Built once from the session context and queried synchronously anywhere a
/// yes/no decision about an action on a subject is needed. Deny rules take
/// precedence over allow rules when both match.
#[derive(Debug, Clone)]
pub struct Ability {
    context: AbilityContext,
    rules: Vec<Rule>,
}

impl Ability {
    /// Build the rule set for a session context
    pub fn for_context(context: AbilityContext) -> Self {
        let rules = match context.role {
            UserRole::SuperAdmin => Self::super_admin_rules(),
            UserRole::Admin => Self::admin_rules(),
            UserRole::Moderator | UserRole::Scorer => Self::read_only_rules(),
            UserRole::User => Self::member_rules(),
        };

        Self { context, rules }
    }

    /// Kind-level query: may this session perform `action` on subjects of
    /// this type at all?
    pub fn can(&self, action: Action, kind: SubjectKind, field: Option<UserField>) -> bool {
        self.evaluate(action, kind, None, field)
    }

    /// Instance query: may this session perform `action` on this specific
    /// record (optionally on one field of it)?
    pub fn can_subject(&self, action: Action, subject: &Subject, field: Option<UserField>) -> bool {
        self.evaluate(action, subject.kind(), Some(subject), field)
    }

    /// Logical negation of [`Ability::can`]
    pub fn cannot(&self, action: Action, kind: SubjectKind, field: Option<UserField>) -> bool {
        !self.can(action, kind, field)
    }

    /// Logical negation of [`Ability::can_subject`]
    pub fn cannot_subject(
        &self,
        action: Action,
        subject: &Subject,
        field: Option<UserField>,
    ) -> bool {
        !self.can_subject(action, subject, field)
    }

    fn evaluate(
        &self,
        action: Action,
        kind: SubjectKind,
        instance: Option<&Subject>,
        field: Option<UserField>,
    ) -> bool {
        let mut allowed = false;

        for rule in &self.rules {
            if !rule.matches(&self.context, action, kind, instance, field) {
                continue;
            }
            match rule.effect {
                // Explicit deny wins regardless of any allow
                Effect::Deny => return false,
                Effect::Allow => allowed = true,
            }
        }

        allowed
    }

    fn super_admin_rules() -> Vec<Rule> {
        vec![
            Rule::allow(Action::Read, SubjectKind::User),
            Rule::allow(Action::Create, SubjectKind::User),
            Rule::allow(Action::Update, SubjectKind::User),
            Rule::allow(Action::Delete, SubjectKind::User),
            Rule::allow(Action::ChangeRole, SubjectKind::User),
            // Peer protection: no destructive or role operations against
            // another SuperAdmin record, actor role notwithstanding
            Rule::deny(Action::Delete, SubjectKind::User)
                .when(Condition::TargetRoleIs(UserRole::SuperAdmin)),
            Rule::deny(Action::ChangeRole, SubjectKind::User)
                .when(Condition::TargetRoleIs(UserRole::SuperAdmin)),
            Rule::deny(Action::Update, SubjectKind::User)
                .with_fields(&[UserField::Role])
                .when(Condition::TargetRoleIs(UserRole::SuperAdmin)),
            Rule::allow(Action::Read, SubjectKind::Tournament),
            Rule::allow(Action::Create, SubjectKind::Tournament),
            Rule::allow(Action::Update, SubjectKind::Tournament),
            Rule::allow(Action::Delete, SubjectKind::Tournament),
        ]
    }

    fn admin_rules() -> Vec<Rule> {
        vec![
            Rule::allow(Action::Read, SubjectKind::User),
            Rule::allow(Action::Update, SubjectKind::User).with_fields(PROFILE_FIELDS),
            Rule::allow(Action::Read, SubjectKind::Tournament),
        ]
    }

    fn read_only_rules() -> Vec<Rule> {
        vec![
            Rule::allow(Action::Read, SubjectKind::User),
            Rule::allow(Action::Read, SubjectKind::Tournament),
        ]
    }

    fn member_rules() -> Vec<Rule> {
        vec![
            Rule::allow(Action::Read, SubjectKind::User).when(Condition::SelfOnly),
            Rule::allow(Action::Update, SubjectKind::User)
                .with_fields(PROFILE_FIELDS)
                .when(Condition::SelfOnly),
            Rule::allow(Action::Read, SubjectKind::Tournament),
        ]
    }
}
