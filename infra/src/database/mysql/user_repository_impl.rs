//! MySQL implementation of the UserRepository trait.
//!
//! Concrete credential persistence using SQLx. Email values are expected
//! pre-normalized and token values pre-hashed by the core; this layer only
//! moves them in and out of the `users` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use md_core::domain::entities::user::{User, UserRole};
use md_core::domain::value_objects::address::Address;
use md_core::errors::{AuthError, DomainError};
use md_core::repositories::UserRepository;

const USER_COLUMNS: &str = r#"
    id, email, phone_number, password_hash, role,
    first_name, last_name, alternate_number,
    address_street, address_city, address_state, address_zip,
    email_verified_at, verification_token_hash, verification_token_expires_at,
    password_reset_token_hash, password_reset_token_expires_at,
    is_active, is_blocked, created_at, updated_at
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| Self::column_error("id", e))?;
        let role_str: String = row
            .try_get("role")
            .map_err(|e| Self::column_error("role", e))?;
        let role = UserRole::parse(&role_str).ok_or_else(|| DomainError::Internal {
            message: format!("Unknown role value in store: {}", role_str),
        })?;

        let street: Option<String> = row
            .try_get("address_street")
            .map_err(|e| Self::column_error("address_street", e))?;
        let address = match street {
            Some(street) => Some(Address {
                street,
                city: row
                    .try_get("address_city")
                    .map_err(|e| Self::column_error("address_city", e))?,
                state: row
                    .try_get("address_state")
                    .map_err(|e| Self::column_error("address_state", e))?,
                zip: row
                    .try_get("address_zip")
                    .map_err(|e| Self::column_error("address_zip", e))?,
            }),
            None => None,
        };

        Ok(User {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid UUID in store: {}", e),
            })?,
            email: row
                .try_get("email")
                .map_err(|e| Self::column_error("email", e))?,
            phone_number: row
                .try_get("phone_number")
                .map_err(|e| Self::column_error("phone_number", e))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|e| Self::column_error("password_hash", e))?,
            role,
            first_name: row
                .try_get("first_name")
                .map_err(|e| Self::column_error("first_name", e))?,
            last_name: row
                .try_get("last_name")
                .map_err(|e| Self::column_error("last_name", e))?,
            alternate_number: row
                .try_get("alternate_number")
                .map_err(|e| Self::column_error("alternate_number", e))?,
            address,
            email_verified_at: row
                .try_get::<Option<DateTime<Utc>>, _>("email_verified_at")
                .map_err(|e| Self::column_error("email_verified_at", e))?,
            verification_token_hash: row
                .try_get("verification_token_hash")
                .map_err(|e| Self::column_error("verification_token_hash", e))?,
            verification_token_expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("verification_token_expires_at")
                .map_err(|e| Self::column_error("verification_token_expires_at", e))?,
            password_reset_token_hash: row
                .try_get("password_reset_token_hash")
                .map_err(|e| Self::column_error("password_reset_token_hash", e))?,
            password_reset_token_expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("password_reset_token_expires_at")
                .map_err(|e| Self::column_error("password_reset_token_expires_at", e))?,
            is_active: row
                .try_get("is_active")
                .map_err(|e| Self::column_error("is_active", e))?,
            is_blocked: row
                .try_get("is_blocked")
                .map_err(|e| Self::column_error("is_blocked", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| Self::column_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| Self::column_error("updated_at", e))?,
        })
    }

    fn column_error(column: &str, e: sqlx::Error) -> DomainError {
        DomainError::Internal {
            message: format!("Failed to read column {}: {}", column, e),
        }
    }

    fn query_error(e: sqlx::Error) -> DomainError {
        // MySQL duplicate-key violations surface as the uniform duplicate
        // error; which unique index fired is not reported
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.code().as_deref() == Some("23000") {
                return DomainError::Auth(AuthError::DuplicateAccount);
            }
        }
        DomainError::Internal {
            message: format!("Database query failed: {}", e),
        }
    }

    async fn find_one(&self, where_clause: &str, value: &str) -> Result<Option<User>, DomainError> {
        let query = format!(
            "SELECT {} FROM users WHERE {} LIMIT 1",
            USER_COLUMNS, where_clause
        );

        let result = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::query_error)?;

        match result {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email = ?", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("id = ?", &id.to_string()).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, DomainError> {
        self.find_one("phone_number = ?", phone_number).await
    }

    async fn find_by_verification_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        self.find_one("verification_token_hash = ?", token_hash)
            .await
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<User>, DomainError> {
        self.find_one("password_reset_token_hash = ?", token_hash)
            .await
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, email, phone_number, password_hash, role,
                first_name, last_name, alternate_number,
                address_street, address_city, address_state, address_zip,
                email_verified_at, verification_token_hash, verification_token_expires_at,
                password_reset_token_hash, password_reset_token_expires_at,
                is_active, is_blocked, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.alternate_number)
            .bind(user.address.as_ref().map(|a| a.street.as_str()))
            .bind(user.address.as_ref().map(|a| a.city.as_str()))
            .bind(user.address.as_ref().map(|a| a.state.as_str()))
            .bind(user.address.as_ref().map(|a| a.zip.as_str()))
            .bind(user.email_verified_at)
            .bind(&user.verification_token_hash)
            .bind(user.verification_token_expires_at)
            .bind(&user.password_reset_token_hash)
            .bind(user.password_reset_token_expires_at)
            .bind(user.is_active)
            .bind(user.is_blocked)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(Self::query_error)?;

        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            UPDATE users SET
                email = ?, phone_number = ?, password_hash = ?, role = ?,
                first_name = ?, last_name = ?, alternate_number = ?,
                address_street = ?, address_city = ?, address_state = ?, address_zip = ?,
                email_verified_at = ?, verification_token_hash = ?, verification_token_expires_at = ?,
                password_reset_token_hash = ?, password_reset_token_expires_at = ?,
                is_active = ?, is_blocked = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.alternate_number)
            .bind(user.address.as_ref().map(|a| a.street.as_str()))
            .bind(user.address.as_ref().map(|a| a.city.as_str()))
            .bind(user.address.as_ref().map(|a| a.state.as_str()))
            .bind(user.address.as_ref().map(|a| a.zip.as_str()))
            .bind(user.email_verified_at)
            .bind(&user.verification_token_hash)
            .bind(user.verification_token_expires_at)
            .bind(&user.password_reset_token_hash)
            .bind(user.password_reset_token_expires_at)
            .bind(user.is_active)
            .bind(user.is_blocked)
            .bind(user.updated_at)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(Self::query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        Ok(user)
    }

    async fn update_password_and_clear_reset_token(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        // One statement: the new hash and the token clear commit together
        let query = r#"
            UPDATE users SET
                password_hash = ?,
                password_reset_token_hash = NULL,
                password_reset_token_expires_at = NULL,
                updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(Self::query_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound {
                resource: "User".to_string(),
            });
        }

        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::query_error)?;
        Ok(count > 0)
    }

    async fn exists_by_phone(&self, phone_number: &str) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE phone_number = ?")
            .bind(phone_number)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::query_error)?;
        Ok(count > 0)
    }
}
