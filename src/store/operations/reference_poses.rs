use chrono::{DateTime, Utc};
use pose_similarity::{LandmarkScheme, LandmarkSet};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// 已登记的参考姿态
///
/// `pose` 为 `None` 表示参考图像未检测到姿态，基于它的会话比较不可用。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredReference {
    pub name: String,
    pub scheme: LandmarkScheme,
    pub pose: Option<LandmarkSet>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredReference {
    pub fn is_detected(&self) -> bool {
        self.pose.is_some()
    }
}

impl Store {
    /// 写入参考姿态，已存在时保留原创建时间
    pub fn upsert_reference(
        &self,
        name: &str,
        scheme: LandmarkScheme,
        pose: Option<LandmarkSet>,
    ) -> Result<StoredReference, StoreError> {
        let key = keys::reference_key(name);
        let now = Utc::now();
        let created_at = match self.reference_poses.get(key.as_bytes())? {
            Some(raw) => Self::deserialize::<StoredReference>(&raw)?.created_at,
            None => now,
        };

        let reference = StoredReference {
            name: name.to_string(),
            scheme,
            pose,
            created_at,
            updated_at: now,
        };
        self.reference_poses
            .insert(key.as_bytes(), Self::serialize(&reference)?)?;
        Ok(reference)
    }

    pub fn get_reference(&self, name: &str) -> Result<Option<StoredReference>, StoreError> {
        let key = keys::reference_key(name);
        match self.reference_poses.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_references(&self) -> Result<Vec<StoredReference>, StoreError> {
        let mut references = Vec::new();
        for item in self.reference_poses.iter() {
            let (_, v) = item?;
            references.push(Self::deserialize::<StoredReference>(&v)?);
        }
        references.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(references)
    }

    /// 删除参考姿态，返回是否存在
    pub fn delete_reference(&self, name: &str) -> Result<bool, StoreError> {
        let key = keys::reference_key(name);
        Ok(self.reference_poses.remove(key.as_bytes())?.is_some())
    }
}
