//! Who may touch what.
//!
//! One function per resource type. Handlers load the resource first, answer
//! 404 if it is absent, then ask the policy and answer 403 on [`Permission::Deny`].

/// The authenticated user making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Allow,
    Deny,
}

impl Permission {
    pub fn is_allowed(self) -> bool {
        self == Permission::Allow
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Permission::Allow
        } else {
            Permission::Deny
        }
    }
}

/// Visibility scope of an allergen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllergenScope {
    Global,
    /// `owner` is `None` once the creating user has been deleted.
    Personal { owner: Option<i64> },
}

impl AllergenScope {
    pub fn from_row(is_global: bool, created_by: Option<i64>) -> Self {
        if is_global {
            AllergenScope::Global
        } else {
            AllergenScope::Personal { owner: created_by }
        }
    }

    pub fn is_global(self) -> bool {
        matches!(self, AllergenScope::Global)
    }
}

/// View, update or delete a dish: its owner, or any staff user.
pub fn dish(actor: &Actor, owner_id: i64) -> Permission {
    Permission::from_bool(actor.id == owner_id || actor.is_staff)
}

/// Rename or delete an allergen.
///
/// Global allergens belong to staff. Personal allergens belong to their owner
/// alone; staff gets no override.
pub fn allergen(actor: &Actor, scope: AllergenScope) -> Permission {
    match scope {
        AllergenScope::Global => Permission::from_bool(actor.is_staff),
        AllergenScope::Personal { owner } => Permission::from_bool(owner == Some(actor.id)),
    }
}

pub fn create_global_allergen(actor: &Actor) -> Permission {
    Permission::from_bool(actor.is_staff)
}

/// List, create and edit user accounts.
pub fn manage_users(actor: &Actor) -> Permission {
    Permission::from_bool(actor.is_staff)
}
