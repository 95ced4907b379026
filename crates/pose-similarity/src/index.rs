//! 综合相似度指数
//!
//! index = 1 − (0.5 · euclidean / running_max + 0.5 · angular / 180)
//!
//! 位置项与角度项等权。结果不做截断：当前帧刚好刷新最大距离时位置项恰为 1，
//! 指数可能落在 [0, 1] 之外，这是已知的非严格上下界。

const EUCLIDEAN_WEIGHT: f64 = 0.5;
const ANGULAR_WEIGHT: f64 = 0.5;

/// 角度项归一化分母（度）
pub const MAX_ANGLE_DEG: f64 = 180.0;

/// 组合欧氏距离与角度差，得到相似度指数（越大越相似）
///
/// `running_max` 为 0 时位置项按约定取 0（首帧的 0/0 情况）。
/// 传入无穷大会得到 `-inf`，调用方应在缺失姿态时短路，不要走到这里。
pub fn similarity_index(euclidean: f64, angular: f64, running_max: f64) -> f64 {
    let normalized_euclidean = if running_max == 0.0 {
        0.0
    } else {
        euclidean / running_max
    };
    let normalized_angular = angular / MAX_ANGLE_DEG;

    1.0 - (EUCLIDEAN_WEIGHT * normalized_euclidean + ANGULAR_WEIGHT * normalized_angular)
}

/// 更新历史最大欧氏距离，单调不减
///
/// 与朴素的 `max(current, running_max)` 不同：非有限的 `current`
/// （缺失姿态的 `INFINITY` 哨兵或 NaN）被忽略，直接返回原值，
/// 避免一帧缺失就让之后所有帧的位置项归零。
pub fn update_running_max(current: f64, running_max: f64) -> f64 {
    if current.is_finite() && current > running_max {
        current
    } else {
        running_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_pose_scores_one() {
        assert_eq!(similarity_index(0.0, 0.0, 5.0), 1.0);
    }

    #[test]
    fn zero_running_max_uses_zero_positional_term() {
        assert_eq!(similarity_index(0.3, 0.0, 0.0), 1.0);
        assert!((similarity_index(0.3, 90.0, 0.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn new_maximum_frame_contributes_full_positional_term() {
        let running_max = update_running_max(0.3, 0.0);
        assert_eq!(running_max, 0.3);
        assert!((similarity_index(0.3, 0.0, running_max) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn worst_case_reaches_zero() {
        assert!(similarity_index(2.0, 180.0, 2.0).abs() < 1e-12);
    }

    #[test]
    fn infinite_input_degenerates_to_negative_infinity() {
        assert_eq!(similarity_index(f64::INFINITY, 10.0, 1.0), f64::NEG_INFINITY);
    }

    #[test]
    fn running_max_ignores_smaller_and_non_finite_values() {
        assert_eq!(update_running_max(0.2, 0.5), 0.5);
        assert_eq!(update_running_max(f64::INFINITY, 0.5), 0.5);
        assert_eq!(update_running_max(f64::NAN, 0.5), 0.5);
        assert_eq!(update_running_max(0.7, 0.5), 0.7);
    }
}
