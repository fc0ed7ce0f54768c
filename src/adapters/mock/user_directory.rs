use crate::domain::value_objects::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Mock implementation of UserDirectory
///
/// Stores users with their name, role and enabled flag.
/// Name lookups can be switched into a failing mode.
pub struct UserDirectory {
    users: Mutex<HashMap<UserId, MockUser>>,
    failing_name_lookups: AtomicBool,
}

struct MockUser {
    name: String,
    is_borrower: bool,
    enabled: bool,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            failing_name_lookups: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `get_user_name` call fail
    pub fn fail_name_lookups(&self, failing: bool) {
        self.failing_name_lookups.store(failing, Ordering::SeqCst);
    }

    /// Add an enabled borrower for testing purposes
    pub fn add_borrower(&self, user_id: UserId, name: &str) {
        self.insert(user_id, name, true, true);
    }

    /// Add a borrower whose account is disabled
    pub fn add_disabled_borrower(&self, user_id: UserId, name: &str) {
        self.insert(user_id, name, true, false);
    }

    /// Add an enabled user without the borrower role (e.g. staff)
    pub fn add_non_borrower(&self, user_id: UserId, name: &str) {
        self.insert(user_id, name, false, true);
    }

    fn insert(&self, user_id: UserId, name: &str, is_borrower: bool, enabled: bool) {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                user_id,
                MockUser {
                    name: name.to_string(),
                    is_borrower,
                    enabled,
                },
            );
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn is_borrower(&self, user_id: UserId) -> Result<bool> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&user_id).is_some_and(|user| user.is_borrower))
    }

    async fn is_enabled(&self, user_id: UserId) -> Result<bool> {
        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&user_id).is_some_and(|user| user.enabled))
    }

    async fn get_user_name(&self, user_id: UserId) -> Result<Option<String>> {
        if self.failing_name_lookups.load(Ordering::SeqCst) {
            return Err("mock user directory name lookup is failing".into());
        }

        let users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&user_id).map(|user| user.name.clone()))
    }
}
