use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::Result;
use crate::wizard::Wizard;

/// One wizard session: the per-tab application state plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    pub id: String,
    pub wizard: Wizard,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            wizard: Wizard::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for storing and retrieving wizard sessions
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn save(&self, session: WizardSession) -> Result<()>;
    async fn get(&self, id: &str) -> Result<Option<WizardSession>>;
    async fn delete(&self, id: &str) -> Result<()>;
}

/// In-memory implementation of SessionStorage
pub struct InMemorySessionStorage {
    sessions: Arc<DashMap<String, WizardSession>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn save(&self, mut session: WizardSession) -> Result<()> {
        session.updated_at = Utc::now();
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<WizardSession>> {
        Ok(self.sessions.get(id).map(|entry| entry.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.sessions.remove(id);
        Ok(())
    }
}
