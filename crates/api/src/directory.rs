//! Staff directory port and the in-memory implementation.
//!
//! The real deployment backs this with the staff database; gates only need
//! `find_by_id`, and they call it on every check so that a role change (or a
//! deleted account) takes effect on the very next request.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use aperture_auth::{Role, StaffId};

/// A staff (or client) account as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Read-side port for staff lookups.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn find_by_id(&self, id: StaffId) -> anyhow::Result<Option<StaffRecord>>;
}

/// In-memory directory for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryStaffDirectory {
    records: RwLock<HashMap<StaffId, StaffRecord>>,
}

impl InMemoryStaffDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: StaffRecord) {
        self.records.write().await.insert(record.id, record);
    }

    pub async fn remove(&self, id: StaffId) -> Option<StaffRecord> {
        self.records.write().await.remove(&id)
    }

    pub async fn set_role(&self, id: StaffId, role: Role) -> bool {
        match self.records.write().await.get_mut(&id) {
            Some(record) => {
                record.role = role;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl StaffDirectory for InMemoryStaffDirectory {
    async fn find_by_id(&self, id: StaffId) -> anyhow::Result<Option<StaffRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_reflects_latest_write() {
        let directory = InMemoryStaffDirectory::new();
        let id = StaffId::new();
        directory
            .insert(StaffRecord {
                id,
                name: "Mina".to_string(),
                email: "mina@example.com".to_string(),
                role: Role::new("staff"),
            })
            .await;

        let found = directory.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.role.as_str(), "staff");

        assert!(directory.set_role(id, Role::new("manager")).await);
        let found = directory.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.role.as_str(), "manager");

        directory.remove(id).await;
        assert!(directory.find_by_id(id).await.unwrap().is_none());
    }
}
