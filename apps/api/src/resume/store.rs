//! Résumé version store.
//!
//! `AppState` holds an `Arc<dyn ResumeStore>`; the default backend keeps
//! records in process memory. Swap the backend without touching handlers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use crate::resume::models::{new_resume_id, ResumeData, ResumeRecord};

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// All records, most recently updated first.
    async fn list(&self) -> Result<Vec<ResumeRecord>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<ResumeRecord>, AppError>;

    /// Inserts a new record and returns its id.
    async fn add(&self, name: &str, data: ResumeData) -> Result<String, AppError>;

    /// Replaces name and data of an existing record. Fails with `NotFound`
    /// when no record has this id.
    async fn update(&self, id: &str, name: &str, data: ResumeData) -> Result<ResumeRecord, AppError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    async fn clear(&self) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct MemoryResumeStore {
    records: RwLock<HashMap<String, ResumeRecord>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn list(&self) -> Result<Vec<ResumeRecord>, AppError> {
        let records = self.records.read().await;
        let mut all: Vec<ResumeRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get(&self, id: &str) -> Result<Option<ResumeRecord>, AppError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn add(&self, name: &str, data: ResumeData) -> Result<String, AppError> {
        let id = new_resume_id();
        let now = Utc::now();
        let record = ResumeRecord {
            id: id.clone(),
            name: name.to_string(),
            data,
            created_at: now,
            updated_at: now,
        };
        self.records.write().await.insert(id.clone(), record);
        info!("Stored résumé '{}' as {}", name, id);
        Ok(id)
    }

    async fn update(&self, id: &str, name: &str, data: ResumeData) -> Result<ResumeRecord, AppError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
        record.name = name.to_string();
        record.data = data;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.records.write().await.remove(id).is_some())
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.records.write().await.clear();
        Ok(())
    }
}
