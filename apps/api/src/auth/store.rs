//! User persistence behind a `UserStore` trait: PostgreSQL in production,
//! in-memory for tests and database-less runs.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;

/// A validated signup with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

impl NewUser {
    fn into_row(self) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: Utc::now(),
        }
    }
}

fn duplicate(email: &str) -> AppError {
    AppError::Conflict(format!("User already exists: {email}"))
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError>;

    /// Fails with `Conflict` if the email is already registered.
    async fn insert(&self, user: NewUser) -> Result<UserRow, AppError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRow, AppError> {
        let row = user.into_row();
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(&row.email)
        .bind(&row.password_hash)
        .bind(row.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(row),
            // Lost a race with a concurrent signup for the same address.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(duplicate(&row.email)),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<UserRow>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRow>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRow, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(duplicate(&user.email));
        }
        let row = user.into_row();
        users.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password_hash: "$2b$04$hash".into(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_insert_and_find() {
        let store = MemoryUserStore::new();
        let row = store.insert(new_user("ada@example.com")).await.unwrap();

        let found = store.find_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, row.id);
        assert!(store.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate() {
        let store = MemoryUserStore::new();
        store.insert(new_user("ada@example.com")).await.unwrap();
        assert!(matches!(
            store.insert(new_user("ada@example.com")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let row = new_user("ada@example.com").into_row();
        let value = serde_json::to_value(&row).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "ada@example.com");
    }
}
