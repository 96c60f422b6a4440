//! # Actors and Capabilities
//!
//! Every mutating call carries an [`Actor`] supplied by the identity
//! provider. The engine trusts it and only checks capabilities.
//!
//! ## Role → Capability Matrix
//! ```text
//! ┌──────────────┬────────────────┬────────────────┬────────────────────┐
//! │ Role         │ ManageCatalog  │ ManagePeriods  │ RecordTransactions │
//! ├──────────────┼────────────────┼────────────────┼────────────────────┤
//! │ admin        │       ✓        │       ✓        │         ✓          │
//! │ superuser    │       ✓        │       ✓        │         ✓          │
//! │ ud_operator  │                │                │         ✓          │
//! └──────────────┴────────────────┴────────────────┴────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, EngineResult};

/// Role attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    UdOperator,
    Superuser,
}

impl Role {
    /// Capabilities granted to this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin | Role::Superuser => &[
                Capability::ManageCatalog,
                Capability::ManagePeriods,
                Capability::RecordTransactions,
            ],
            Role::UdOperator => &[Capability::RecordTransactions],
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::UdOperator => "ud_operator",
            Role::Superuser => "superuser",
        })
    }
}

/// Something an operation requires of its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Trading units, kitchens and goods.
    ManageCatalog,
    /// Period create/update/close/delete.
    ManagePeriods,
    /// Transaction create/update/complete/cancel.
    RecordTransactions,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::ManageCatalog => "manage catalog",
            Capability::ManagePeriods => "manage periods",
            Capability::RecordTransactions => "record transactions",
        })
    }
}

/// The identity behind a mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor { id: id.into(), role }
    }

    /// Fails with [`EngineError::Forbidden`] unless the role grants `capability`.
    pub fn require(&self, capability: Capability) -> EngineResult<()> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                role: self.role,
                capability,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_records_but_does_not_manage() {
        let operator = Actor::new("op-1", Role::UdOperator);
        assert!(operator.require(Capability::RecordTransactions).is_ok());
        assert!(operator.require(Capability::ManageCatalog).is_err());
        assert!(operator.require(Capability::ManagePeriods).is_err());
    }

    #[test]
    fn test_admin_and_superuser_have_everything() {
        for role in [Role::Admin, Role::Superuser] {
            let actor = Actor::new("a", role);
            assert!(actor.require(Capability::ManageCatalog).is_ok());
            assert!(actor.require(Capability::ManagePeriods).is_ok());
            assert!(actor.require(Capability::RecordTransactions).is_ok());
        }
    }

    #[test]
    fn test_forbidden_message() {
        let err = Actor::new("op-1", Role::UdOperator)
            .require(Capability::ManagePeriods)
            .unwrap_err();
        assert_eq!(err.to_string(), "Role ud_operator is not allowed to manage periods");
    }
}
