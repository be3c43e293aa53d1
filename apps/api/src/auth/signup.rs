use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::auth::store::{NewUser, UserStore};
use crate::errors::AppError;
use crate::models::user::UserRow;

pub const BCRYPT_COST: u32 = 12;

/// Missing fields deserialize as empty so they surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupRequest {
    fn validate(&self) -> Result<(), AppError> {
        let complete = [&self.first_name, &self.last_name, &self.email, &self.password]
            .iter()
            .all(|v| !v.trim().is_empty());
        if complete {
            Ok(())
        } else {
            Err(AppError::Validation("All fields are required".to_string()))
        }
    }
}

/// Emails are compared trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registers a new account with a bcrypt-hashed password.
pub async fn register_user(
    store: &dyn UserStore,
    request: SignupRequest,
    cost: u32,
) -> Result<UserRow, AppError> {
    request.validate()?;

    let email = normalize_email(&request.email);
    if store.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .context("password hashing task failed")?
        .context("password hashing failed")?;

    let user = store
        .insert(NewUser {
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email,
            password_hash,
        })
        .await?;

    info!("Registered user {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryUserStore;

    const TEST_COST: u32 = 4;

    fn request() -> SignupRequest {
        SignupRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: " Ada@Example.com ".into(),
            password: "analytical-engine".into(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let store = MemoryUserStore::new();
        let user = register_user(&store, request(), TEST_COST).await.unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "analytical-engine");
        assert!(bcrypt::verify("analytical-engine", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryUserStore::new();
        register_user(&store, request(), TEST_COST).await.unwrap();

        let mut again = request();
        again.email = "ada@example.com".into();
        assert!(matches!(
            register_user(&store, again, TEST_COST).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let store = MemoryUserStore::new();
        let mut incomplete = request();
        incomplete.last_name = " ".into();
        assert!(matches!(
            register_user(&store, incomplete, TEST_COST).await,
            Err(AppError::Validation(_))
        ));
        assert!(store.find_by_email("ada@example.com").await.unwrap().is_none());
    }
}
