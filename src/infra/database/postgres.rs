//! PostgreSQL database client implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{
    AppError, Company, CompanyRepository, DatabaseError, HealthCheck, NewCompany, NewPosition,
    NewUser, Position, PositionRepository, TOPUP_NOTE, Transaction, TransactionRepository,
    TransactionType, User, UserRepository,
};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, secret_id, email, phone, address, position_id, created_at, updated_at";
const POSITION_COLUMNS: &str = "id, name, salary, created_at, updated_at";
const COMPANY_COLUMNS: &str = "id, name, address, balance, created_at, updated_at";

/// PostgreSQL database client with connection pooling
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client with default configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Migration(e.to_string())))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_position(row: &PgRow) -> Position {
        Position {
            id: row.get("id"),
            name: row.get("name"),
            salary: row.get("salary"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_user(row: &PgRow) -> User {
        User {
            id: row.get("id"),
            name: row.get("name"),
            secret_id: row.get("secret_id"),
            email: row.get("email"),
            phone: row.get("phone"),
            address: row.get("address"),
            position_id: row.get("position_id"),
            position: None,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_company(row: &PgRow) -> Company {
        Company {
            id: row.get("id"),
            name: row.get("name"),
            address: row.get("address"),
            balance: row.get("balance"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_transaction(row: &PgRow) -> Result<Transaction, AppError> {
        let type_str: String = row.get("type");
        Ok(Transaction {
            id: row.get("id"),
            amount: row.get("amount"),
            note: row.get("note"),
            r#type: type_str.parse().map_err(AppError::Internal)?,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl HealthCheck for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.name, u.secret_id, u.email, u.phone, u.address,
                   u.position_id, u.created_at, u.updated_at,
                   p.name AS position_name, p.salary AS position_salary,
                   p.created_at AS position_created_at, p.updated_at AS position_updated_at
            FROM users u
            JOIN positions p ON p.id = u.position_id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {}", id)))?;

        let mut user = Self::row_to_user(&row);
        user.position = Some(Position {
            id: user.position_id,
            name: row.get("position_name"),
            salary: row.get("position_salary"),
            created_at: row.get("position_created_at"),
            updated_at: row.get("position_updated_at"),
        });
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_user).collect())
    }

    #[instrument(skip(self, user), fields(name = %user.name, position_id = user.position_id))]
    async fn create(&self, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, secret_id, email, phone, address, position_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.secret_id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.position_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_user(&row))
    }

    #[instrument(skip(self, user), fields(name = %user.name))]
    async fn update_by_id(&self, id: i64, user: &NewUser) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = $1, secret_id = $2, email = $3, phone = $4, address = $5,
                position_id = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.secret_id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.position_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("user {}", id)))?;

        Ok(Self::row_to_user(&row))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("user {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PositionRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Position, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM positions WHERE id = $1",
            POSITION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("position {}", id)))?;

        Ok(Self::row_to_position(&row))
    }

    #[instrument(skip(self))]
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Position>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM positions ORDER BY id ASC LIMIT $1 OFFSET $2",
            POSITION_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_position).collect())
    }

    #[instrument(skip(self, position), fields(name = %position.name))]
    async fn create(&self, position: &NewPosition) -> Result<Position, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO positions (name, salary) VALUES ($1, $2) RETURNING {}",
            POSITION_COLUMNS
        ))
        .bind(&position.name)
        .bind(position.salary)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_position(&row))
    }

    #[instrument(skip(self, position), fields(name = %position.name))]
    async fn update_by_id(&self, id: i64, position: &NewPosition) -> Result<Position, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE positions
            SET name = $1, salary = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            POSITION_COLUMNS
        ))
        .bind(&position.name)
        .bind(position.salary)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("position {}", id)))?;

        Ok(Self::row_to_position(&row))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("position {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn get(&self) -> Result<Company, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM companies ORDER BY id ASC LIMIT 1",
            COMPANY_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("company"))?;

        Ok(Self::row_to_company(&row))
    }

    #[instrument(skip(self, company), fields(name = %company.name))]
    async fn create_or_update(&self, company: &NewCompany) -> Result<Company, AppError> {
        // The unique `singleton` column turns a racing second insert into an update.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO companies (name, address, balance)
            VALUES ($1, $2, $3)
            ON CONFLICT (singleton) DO UPDATE
            SET name = EXCLUDED.name,
                address = EXCLUDED.address,
                balance = EXCLUDED.balance,
                updated_at = NOW()
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(&company.name)
        .bind(&company.address)
        .bind(company.balance)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_company(&row))
    }

    #[instrument(skip(self))]
    async fn add_balance(&self, amount: i64) -> Result<Company, AppError> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query("SELECT id FROM companies ORDER BY id ASC LIMIT 1 FOR UPDATE")
            .fetch_optional(&mut *tx)
            .await?
            .map(|row| row.get("id"))
            .ok_or_else(|| AppError::not_found("company"))?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE companies
            SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(amount)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(r#"INSERT INTO transactions (amount, note, "type") VALUES ($1, $2, $3)"#)
            .bind(amount)
            .bind(TOPUP_NOTE)
            .bind(TransactionType::Credit.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Self::row_to_company(&row))
    }

    #[instrument(skip(self, note))]
    async fn debit_balance(&self, amount: i64, note: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query(
            r#"
            UPDATE companies
            SET balance = balance - $1, updated_at = NOW()
            WHERE id = (SELECT id FROM companies ORDER BY id ASC LIMIT 1)
              AND balance >= $1
            "#,
        )
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            // Dropping `tx` rolls back; report why nothing was debited.
            let available: Option<i64> =
                sqlx::query("SELECT balance FROM companies ORDER BY id ASC LIMIT 1")
                    .fetch_optional(&mut *tx)
                    .await?
                    .map(|row| row.get("balance"));

            return Err(match available {
                Some(available) => AppError::InsufficientBalance {
                    available,
                    requested: amount,
                },
                None => AppError::not_found("company"),
            });
        }

        sqlx::query(r#"INSERT INTO transactions (amount, note, "type") VALUES ($1, $2, $3)"#)
            .bind(amount)
            .bind(note)
            .bind(TransactionType::Debit.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, amount, note, "type", created_at
            FROM transactions
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_transaction).collect()
    }
}
