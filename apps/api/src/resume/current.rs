use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::resume::models::ResumeData;
use crate::resume::validation::validate_resume;

/// Holds the résumé currently on display. Owned by `AppState`.
#[derive(Clone)]
pub struct CurrentResume {
    default: ResumeData,
    tx: Arc<watch::Sender<ResumeData>>,
}

impl CurrentResume {
    pub fn new(default: ResumeData) -> Self {
        let (tx, _rx) = watch::channel(default.clone());
        Self {
            default,
            tx: Arc::new(tx),
        }
    }

    pub fn get(&self) -> ResumeData {
        self.tx.borrow().clone()
    }

    pub fn set(&self, data: ResumeData) {
        self.tx.send_replace(data);
    }

    /// Restores the résumé loaded at startup.
    pub fn reset(&self) {
        self.tx.send_replace(self.default.clone());
    }
}

/// Loads the bundled résumé JSON. A missing file yields an empty résumé;
/// a present but malformed one is a startup error.
pub fn load_default_resume(path: &Path) -> Result<ResumeData> {
    if !path.exists() {
        warn!("Default résumé {} not found, starting empty", path.display());
        return Ok(ResumeData::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let data = validate_resume(&value)
        .into_result()
        .map_err(|e| anyhow::anyhow!("{} is not a valid résumé: {e}", path.display()))?;

    info!("Loaded default résumé from {}", path.display());
    Ok(data)
}
