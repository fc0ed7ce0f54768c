use crate::domain::value_objects::BookId;
use crate::ports::book_directory::{BookDirectory as BookDirectoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Mock implementation of BookDirectory
///
/// Supports stateful testing by storing book IDs.
/// Books can be registered as available or unavailable.
pub struct BookDirectory {
    books: Mutex<HashMap<BookId, bool>>,
}

impl BookDirectory {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }

    /// Register an available book for testing purposes
    pub fn add_available_book(&self, book_id: BookId) {
        self.insert(book_id, true);
    }

    /// Register a book that cannot be borrowed
    pub fn add_unavailable_book(&self, book_id: BookId) {
        self.insert(book_id, false);
    }

    fn insert(&self, book_id: BookId, available: bool) {
        self.books
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book_id, available);
    }
}

impl Default for BookDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookDirectoryTrait for BookDirectory {
    /// Unknown books are reported as unavailable
    async fn is_available(&self, book_id: BookId) -> Result<bool> {
        let books = self.books.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(books.get(&book_id).copied().unwrap_or(false))
    }
}
