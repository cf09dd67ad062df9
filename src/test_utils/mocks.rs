//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::{
    AppError, Company, CompanyRepository, DatabaseError, HealthCheck, NewCompany, NewPosition,
    NewUser, Position, PositionRepository, TOPUP_NOTE, Transaction, TransactionRepository,
    TransactionType, User, UserRepository,
};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
    /// When set, only this operation fails (e.g. `"user.update_by_id"`)
    pub failing_operation: Option<String>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            failing_operation: None,
        }
    }

    #[must_use]
    pub fn failure_on(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            failing_operation: Some(operation.into()),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i64, User>,
    positions: BTreeMap<i64, Position>,
    company: Option<Company>,
    transactions: Vec<Transaction>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn push_transaction(&mut self, amount: i64, note: &str, kind: TransactionType) {
        let id = self.next_id();
        self.transactions.push(Transaction {
            id,
            amount,
            note: note.to_string(),
            r#type: kind,
            created_at: Utc::now(),
        });
    }
}

fn page<T: Clone>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

/// In-memory stand-in for the PostgreSQL client.
///
/// Implements every repository trait over one shared store, records each
/// repository call by name, and can be told to fail all or one operation.
pub struct MockDatabaseClient {
    store: Mutex<Store>,
    calls: Mutex<Vec<String>>,
    debits: Mutex<Vec<(i64, String)>>,
    config: MockConfig,
    is_healthy: AtomicBool,
}

impl MockDatabaseClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            calls: Mutex::new(Vec::new()),
            debits: Mutex::new(Vec::new()),
            config,
            is_healthy: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    #[must_use]
    pub fn failing_on(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure_on(operation, message))
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }

    /// Seed a position without recording a call
    pub fn insert_position(&self, name: &str, salary: i64) -> Position {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let position = Position {
            id: store.next_id(),
            name: name.to_string(),
            salary,
            created_at: now,
            updated_at: now,
        };
        store.positions.insert(position.id, position.clone());
        position
    }

    /// Seed a user without recording a call
    pub fn insert_user(&self, data: &NewUser) -> User {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: store.next_id(),
            name: data.name.clone(),
            secret_id: data.secret_id.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            address: data.address.clone(),
            position_id: data.position_id,
            position: None,
            created_at: now,
            updated_at: now,
        };
        store.users.insert(user.id, user.clone());
        user
    }

    /// Seed the company record without recording a call
    pub fn set_company(&self, name: &str, address: &str, balance: i64) -> Company {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let company = Company {
            id: store.next_id(),
            name: name.to_string(),
            address: address.to_string(),
            balance,
            created_at: now,
            updated_at: now,
        };
        store.company = Some(company.clone());
        company
    }

    pub fn company(&self) -> Option<Company> {
        self.store.lock().unwrap().company.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.store.lock().unwrap().users.values().cloned().collect()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.store.lock().unwrap().positions.values().cloned().collect()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.store.lock().unwrap().transactions.clone()
    }

    /// Names of the repository operations invoked, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, operation: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == operation)
    }

    /// Arguments of every `debit_balance` call, successful or not
    pub fn debit_calls(&self) -> Vec<(i64, String)> {
        self.debits.lock().unwrap().clone()
    }

    fn record(&self, operation: &str) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(operation.to_string());
        self.check_should_fail(operation)
    }

    fn check_should_fail(&self, operation: &str) -> Result<(), AppError> {
        if !self.config.should_fail {
            return Ok(());
        }
        if let Some(ref only) = self.config.failing_operation {
            if only != operation {
                return Ok(());
            }
        }
        let msg = self
            .config
            .error_message
            .clone()
            .unwrap_or_else(|| "Mock error".to_string());
        Err(AppError::Database(DatabaseError::Query(msg)))
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HealthCheck for MockDatabaseClient {
    async fn health_check(&self) -> Result<(), AppError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::Database(DatabaseError::Connection(
                "Unhealthy".to_string(),
            )));
        }
        self.check_should_fail("health_check")
    }
}

#[async_trait]
impl UserRepository for MockDatabaseClient {
    async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.record("user.find_by_id")?;
        let store = self.store.lock().unwrap();
        let mut user = store
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("user {}", id)))?;
        user.position = store.positions.get(&user.position_id).cloned();
        Ok(user)
    }

    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        self.record("user.fetch")?;
        let store = self.store.lock().unwrap();
        Ok(page(store.users.values().cloned(), limit, offset))
    }

    async fn create(&self, data: &NewUser) -> Result<User, AppError> {
        self.record("user.create")?;
        if !self
            .store
            .lock()
            .unwrap()
            .positions
            .contains_key(&data.position_id)
        {
            return Err(AppError::Database(DatabaseError::ForeignKey(format!(
                "position {} does not exist",
                data.position_id
            ))));
        }
        Ok(self.insert_user(data))
    }

    async fn update_by_id(&self, id: i64, data: &NewUser) -> Result<User, AppError> {
        self.record("user.update_by_id")?;
        let mut store = self.store.lock().unwrap();
        if !store.positions.contains_key(&data.position_id) {
            return Err(AppError::Database(DatabaseError::ForeignKey(format!(
                "position {} does not exist",
                data.position_id
            ))));
        }
        let user = store
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("user {}", id)))?;
        user.name = data.name.clone();
        user.secret_id = data.secret_id.clone();
        user.email = data.email.clone();
        user.phone = data.phone.clone();
        user.address = data.address.clone();
        user.position_id = data.position_id;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.record("user.delete")?;
        self.store
            .lock()
            .unwrap()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("user {}", id)))
    }
}

#[async_trait]
impl PositionRepository for MockDatabaseClient {
    async fn find_by_id(&self, id: i64) -> Result<Position, AppError> {
        self.record("position.find_by_id")?;
        self.store
            .lock()
            .unwrap()
            .positions
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("position {}", id)))
    }

    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Position>, AppError> {
        self.record("position.fetch")?;
        let store = self.store.lock().unwrap();
        Ok(page(store.positions.values().cloned(), limit, offset))
    }

    async fn create(&self, data: &NewPosition) -> Result<Position, AppError> {
        self.record("position.create")?;
        Ok(self.insert_position(&data.name, data.salary))
    }

    async fn update_by_id(&self, id: i64, data: &NewPosition) -> Result<Position, AppError> {
        self.record("position.update_by_id")?;
        let mut store = self.store.lock().unwrap();
        let position = store
            .positions
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("position {}", id)))?;
        position.name = data.name.clone();
        position.salary = data.salary;
        position.updated_at = Utc::now();
        Ok(position.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.record("position.delete")?;
        let mut store = self.store.lock().unwrap();
        if !store.positions.contains_key(&id) {
            return Err(AppError::not_found(format!("position {}", id)));
        }
        if store.users.values().any(|u| u.position_id == id) {
            return Err(AppError::Database(DatabaseError::ForeignKey(format!(
                "position {} is still referenced by users",
                id
            ))));
        }
        store.positions.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl CompanyRepository for MockDatabaseClient {
    async fn get(&self) -> Result<Company, AppError> {
        self.record("company.get")?;
        self.company()
            .ok_or_else(|| AppError::not_found("company"))
    }

    async fn create_or_update(&self, data: &NewCompany) -> Result<Company, AppError> {
        self.record("company.create_or_update")?;
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let company = match store.company.take() {
            Some(existing) => Company {
                name: data.name.clone(),
                address: data.address.clone(),
                balance: data.balance,
                updated_at: now,
                ..existing
            },
            None => Company {
                id: store.next_id(),
                name: data.name.clone(),
                address: data.address.clone(),
                balance: data.balance,
                created_at: now,
                updated_at: now,
            },
        };
        store.company = Some(company.clone());
        Ok(company)
    }

    async fn add_balance(&self, amount: i64) -> Result<Company, AppError> {
        self.record("company.add_balance")?;
        let mut store = self.store.lock().unwrap();
        let company = store
            .company
            .as_mut()
            .ok_or_else(|| AppError::not_found("company"))?;
        company.balance = company.balance.checked_add(amount).ok_or_else(|| {
            AppError::Database(DatabaseError::Query("balance out of range".to_string()))
        })?;
        company.updated_at = Utc::now();
        let updated = company.clone();
        store.push_transaction(amount, TOPUP_NOTE, TransactionType::Credit);
        Ok(updated)
    }

    async fn debit_balance(&self, amount: i64, note: &str) -> Result<(), AppError> {
        self.debits
            .lock()
            .unwrap()
            .push((amount, note.to_string()));
        self.record("company.debit_balance")?;
        let mut store = self.store.lock().unwrap();
        let company = store
            .company
            .as_mut()
            .ok_or_else(|| AppError::not_found("company"))?;
        if company.balance < amount {
            return Err(AppError::InsufficientBalance {
                available: company.balance,
                requested: amount,
            });
        }
        company.balance -= amount;
        company.updated_at = Utc::now();
        store.push_transaction(amount, note, TransactionType::Debit);
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for MockDatabaseClient {
    async fn fetch(&self, limit: i64, offset: i64) -> Result<Vec<Transaction>, AppError> {
        self.record("transaction.fetch")?;
        let store = self.store.lock().unwrap();
        Ok(page(store.transactions.iter().cloned(), limit, offset))
    }
}
