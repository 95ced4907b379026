//! 启动时从文件载入默认参考姿态
//!
//! 文件内容是检测器对参考图像的输出（与 `PUT /api/references/:name` 的请求体同构），
//! 顶层为 `null` 或 `landmarks` 为 `null` 时登记为“未检测到姿态”的参考。

use std::path::Path;

use pose_similarity::PoseError;
use thiserror::Error;

use crate::config::Config;
use crate::payload::PosePayload;
use crate::store::operations::reference_poses::StoredReference;
use crate::store::{Store, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read reference pose file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid reference pose file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid reference landmarks: {0}")]
    Pose(#[from] PoseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn seed_default_reference(
    store: &Store,
    config: &Config,
) -> Result<Option<StoredReference>, SeedError> {
    let Some(path) = config.reference.pose_file.as_deref() else {
        return Ok(None);
    };
    let default_scheme = config.comparison.default_scheme;
    let name = &config.reference.default_name;

    let payload = read_payload(Path::new(path)).await?;
    let (scheme, pose) = match payload {
        Some(payload) => (payload.scheme_or(default_scheme), payload.into_pose(default_scheme)?),
        None => (default_scheme, None),
    };

    let stored = store.upsert_reference(name, scheme, pose)?;
    if stored.is_detected() {
        tracing::info!(name = %stored.name, scheme = %stored.scheme, path, "Reference pose loaded");
    } else {
        tracing::warn!(
            name = %stored.name,
            path,
            "Reference pose file has no detected pose; comparisons against it are unavailable"
        );
    }
    Ok(Some(stored))
}

async fn read_payload(path: &Path) -> Result<Option<PosePayload>, SeedError> {
    let display = path.display().to_string();
    let raw = tokio::fs::read(path).await.map_err(|source| SeedError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| SeedError::Parse {
        path: display,
        source,
    })
}
