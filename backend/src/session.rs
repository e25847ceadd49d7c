//! Caller context passed explicitly into every service operation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Role carried in the identity token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

/// Who is calling. The role is a trusted input resolved by the identity
/// provider; nothing here derives it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub actor: Option<Uuid>,
    pub is_admin: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn customer(actor: Uuid) -> Self {
        Self {
            actor: Some(actor),
            is_admin: false,
        }
    }

    pub fn admin(actor: Uuid) -> Self {
        Self {
            actor: Some(actor),
            is_admin: true,
        }
    }

    /// The authenticated actor, or `AuthenticationRequired`
    pub fn require_actor(&self) -> AppResult<Uuid> {
        self.actor.ok_or(AppError::AuthenticationRequired)
    }

    /// Gate for back-office operations
    pub fn require_admin(&self) -> AppResult<Uuid> {
        let actor = self.require_actor()?;
        if !self.is_admin {
            return Err(AppError::Forbidden);
        }
        Ok(actor)
    }
}
