//! Role-based authorization and user authentication.
//!
//! The allow table in [`authorize`] is the single source of truth for who
//! may do what. UI-level hiding of controls is a convenience; every
//! mutating operation in this crate re-checks the table itself.

use std::fmt;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use model::entities::user::{self, Role};

use crate::error::{OpsError, Result};

/// An operation a role may or may not perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddProduct,
    EditProduct,
    DeleteProduct,
    RecordSale,
    ViewFinance,
    ManageFinance,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::AddProduct => "add product",
            Operation::EditProduct => "edit product",
            Operation::DeleteProduct => "delete product",
            Operation::RecordSale => "record sale",
            Operation::ViewFinance => "view finance",
            Operation::ManageFinance => "manage finance",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The static authorization table. Anything not explicitly allowed is
/// denied.
pub fn authorize(role: Role, operation: Operation) -> bool {
    match (role, operation) {
        (Role::Admin, _) => true,
        (Role::Manager, Operation::AddProduct) => true,
        (Role::Cashier, Operation::RecordSale) => true,
        _ => false,
    }
}

/// Checks the table and returns `Unauthorized` on a denial.
pub fn require(role: Role, operation: Operation) -> Result<()> {
    if authorize(role, operation) {
        Ok(())
    } else {
        warn!("role {} denied operation '{}'", role, operation);
        Err(OpsError::Unauthorized { role, operation })
    }
}

/// Hex-encoded SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Checks a password against a stored digest.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    hash_password(password) == password_hash
}

/// Looks up a user by username and verifies the password.
///
/// Returns `Ok(None)` for a bad username or password; failed credentials
/// are an expected outcome, not an error.
#[instrument(skip(db, password))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    let found = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;

    match found {
        Some(user) if verify_password(password, &user.password_hash) => {
            debug!("user {} authenticated with role {}", user.username, user.role);
            Ok(Some(user))
        }
        Some(_) => {
            warn!("failed login for existing user {}", username);
            Ok(None)
        }
        None => {
            warn!("failed login for unknown user {}", username);
            Ok(None)
        }
    }
}

/// Creates a user at provisioning time. Usernames are unique; the role set
/// is closed, so there is no user-management operation in the role gate.
#[instrument(skip(db, password))]
pub async fn provision_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    role: Role,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() {
        return Err(OpsError::validation("username must not be blank"));
    }
    if password.is_empty() {
        return Err(OpsError::validation("password must not be empty"));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(OpsError::validation(format!(
            "username '{username}' already exists"
        )));
    }

    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    Ok(new_user.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[test]
    fn admin_is_allowed_everything() {
        for op in [
            Operation::AddProduct,
            Operation::EditProduct,
            Operation::DeleteProduct,
            Operation::RecordSale,
            Operation::ViewFinance,
            Operation::ManageFinance,
        ] {
            assert!(authorize(Role::Admin, op), "admin should be allowed to {op}");
        }
    }

    #[test]
    fn manager_may_only_add_products() {
        assert!(authorize(Role::Manager, Operation::AddProduct));
        for op in [
            Operation::EditProduct,
            Operation::DeleteProduct,
            Operation::RecordSale,
            Operation::ViewFinance,
            Operation::ManageFinance,
        ] {
            assert!(!authorize(Role::Manager, op), "manager must be denied {op}");
        }
    }

    #[test]
    fn cashier_may_only_record_sales() {
        assert!(authorize(Role::Cashier, Operation::RecordSale));
        for op in [
            Operation::AddProduct,
            Operation::EditProduct,
            Operation::DeleteProduct,
            Operation::ViewFinance,
            Operation::ManageFinance,
        ] {
            assert!(!authorize(Role::Cashier, op), "cashier must be denied {op}");
        }
    }

    #[test]
    fn require_returns_unauthorized_on_denial() {
        let err = require(Role::Cashier, Operation::DeleteProduct).unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized { .. }));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("admin123");
        assert_eq!(hash.len(), 64);
        assert!(verify_password("admin123", &hash));
        assert!(!verify_password("admin124", &hash));
    }

    #[tokio::test]
    async fn login_accepts_correct_credentials_only() {
        let db = setup_db().await;
        provision_user(&db, "cashier1", "cashier123", Role::Cashier)
            .await
            .unwrap();

        let user = login(&db, "cashier1", "cashier123").await.unwrap();
        assert_eq!(user.unwrap().role, Role::Cashier);

        assert!(login(&db, "cashier1", "wrong").await.unwrap().is_none());
        assert!(login(&db, "ghost", "cashier123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn provisioning_rejects_duplicate_usernames() {
        let db = setup_db().await;
        provision_user(&db, "admin", "admin123", Role::Admin)
            .await
            .unwrap();

        let err = provision_user(&db, "admin", "other", Role::Manager)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }
}
