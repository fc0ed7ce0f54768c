use crate::domain::{Transaction, TransactionStatus, value_objects::TransactionId};
use crate::ports::transaction_repository::{
    Result, TransactionFilter, TransactionRepository as TransactionRepositoryTrait,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// In-memory implementation of TransactionRepository
///
/// Each call takes the lock once, so every write is atomic.
pub struct TransactionRepository {
    transactions: Mutex<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored transactions, for assertions in tests
    pub fn len(&self) -> usize {
        self.transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TransactionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn insert(&self, transaction: &Transaction) -> Result<()> {
        let mut transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if transactions.contains_key(&transaction.transaction_id) {
            return Err(format!(
                "transaction {} already exists",
                transaction.transaction_id.value()
            )
            .into());
        }

        transactions.insert(transaction.transaction_id, transaction.clone());
        Ok(())
    }

    async fn update(&self, transaction: &Transaction) -> Result<bool> {
        let mut transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match transactions.get_mut(&transaction.transaction_id) {
            Some(stored) => {
                *stored = transaction.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, transaction_id: TransactionId) -> Result<bool> {
        let mut transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transactions.remove(&transaction_id).is_some())
    }

    async fn get_by_id(&self, transaction_id: TransactionId) -> Result<Option<Transaction>> {
        let transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transactions.get(&transaction_id).cloned())
    }

    /// Newest borrowed_date first, matching the Postgres ordering
    async fn list(&self, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        let transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut matching: Vec<Transaction> = transactions
            .values()
            .filter(|t| filter.status.is_none_or(|status| t.status() == status))
            .filter(|t| filter.borrower_id.is_none_or(|id| t.borrower_id == id))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.borrowed_date
                .cmp(&a.borrowed_date)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(matching)
    }

    async fn count(&self) -> Result<u64> {
        let transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transactions.len() as u64)
    }

    async fn count_by_status(&self, status: TransactionStatus) -> Result<u64> {
        let transactions = self
            .transactions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(transactions
            .values()
            .filter(|t| t.status() == status)
            .count() as u64)
    }
}
