//! 位置相似度（欧氏距离）
//!
//! 对两组关键点逐点计算三维欧氏距离并取算术平均。值越小越相似，0 表示完全重合。

use crate::landmark::{assert_comparable, LandmarkSet};

/// 平均逐点欧氏距离
///
/// 任一输入为 `None`（未检测到姿态）时返回 `f64::INFINITY`，表示“无法比较 / 最大不相似”。
///
/// # Panics
/// 两组关键点使用不同索引方案时 panic，这属于调用方的配置错误。
pub fn euclidean_similarity(reference: Option<&LandmarkSet>, live: Option<&LandmarkSet>) -> f64 {
    let (Some(reference), Some(live)) = (reference, live) else {
        return f64::INFINITY;
    };
    assert_comparable(reference, live);

    let total: f64 = reference
        .landmarks()
        .iter()
        .zip(live.landmarks())
        .map(|(a, b)| a.distance(b))
        .sum();
    total / reference.len() as f64
}
