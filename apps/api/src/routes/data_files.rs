use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DataFileRecord {
    pub id: String,
    pub name: String,
    pub data: Value,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub source: String,
}

/// GET /api/data-files
/// Every parseable `*.json` in the data directory, sorted by file name.
pub async fn handle_list_data_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<DataFileRecord>>, AppError> {
    let dir = &state.config.data_dir;
    let mut entries = tokio::fs::read_dir(dir).await?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.ends_with(".json") {
            names.push(file_name);
        }
    }
    names.sort();

    let mut records = Vec::with_capacity(names.len());
    for file_name in names {
        let path = dir.join(&file_name);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };
        let data: Value = match serde_json::from_slice(&raw) {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping {}: {e}", path.display());
                continue;
            }
        };

        records.push(DataFileRecord {
            name: file_name.trim_end_matches(".json").to_string(),
            id: file_name,
            data,
            kind: "file",
            source: path.display().to_string(),
        });
    }

    Ok(Json(records))
}
