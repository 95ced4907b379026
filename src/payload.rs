//! 检测器输出的 JSON 表示
//!
//! 关键点既可以是 `[x, y, z]` 三元组，也可以是 MediaPipe 风格的
//! `{ "x", "y", "z", "visibility" }` 对象（多余字段忽略）。
//! `landmarks` 为 `null` 或缺省表示检测器未找到姿态。

use pose_similarity::{Landmark, LandmarkScheme, LandmarkSet, PoseError};
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum LandmarkInput {
    Triple([f64; 3]),
    Point(Landmark),
}

impl From<LandmarkInput> for Landmark {
    fn from(value: LandmarkInput) -> Self {
        match value {
            LandmarkInput::Triple([x, y, z]) => Landmark::new(x, y, z),
            LandmarkInput::Point(point) => point,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosePayload {
    pub scheme: Option<LandmarkScheme>,
    #[serde(default)]
    pub landmarks: Option<Vec<LandmarkInput>>,
}

impl PosePayload {
    pub fn scheme_or(&self, default: LandmarkScheme) -> LandmarkScheme {
        self.scheme.unwrap_or(default)
    }

    /// 转换为 `LandmarkSet`，`Ok(None)` 表示未检测到姿态
    pub fn into_pose(self, default: LandmarkScheme) -> Result<Option<LandmarkSet>, PoseError> {
        let scheme = self.scheme_or(default);
        into_landmark_set(scheme, self.landmarks)
    }
}

/// 区分“字段缺省”与“显式 null”：配合 `#[serde(default)]` 使用，
/// 缺省得到 `None`，`null` 得到 `Some(None)`
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub fn into_landmark_set(
    scheme: LandmarkScheme,
    landmarks: Option<Vec<LandmarkInput>>,
) -> Result<Option<LandmarkSet>, PoseError> {
    landmarks
        .map(|points| LandmarkSet::new(scheme, points.into_iter().map(Landmark::from).collect()))
        .transpose()
}
