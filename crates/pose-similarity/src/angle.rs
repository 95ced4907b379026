//! 关节角度与角度相似度
//!
//! 关节角由三个关键点（近端 - 关节 - 远端）确定，只在 x,y 平面计算：
//! angle = degrees(acos(BA·BC / (|BA|·|BC|)))，范围 [0°, 180°]。
//! 角度相似度取固定关节三元组上的平均绝对角度差。

use serde::Serialize;

use crate::landmark::{assert_comparable, Joint, Landmark, LandmarkSet};

/// 退化关节（骨骼向量长度为 0）在聚合时使用的中性角度：视为伸直
pub const DEGENERATE_ANGLE_DEG: f64 = 180.0;

/// 低于该长度的骨骼向量视为退化
const MIN_BONE_LENGTH: f64 = 1e-9;

/// 近端 - 关节 - 远端 三元组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriplet {
    pub label: &'static str,
    pub proximal: Joint,
    pub vertex: Joint,
    pub distal: Joint,
}

/// 参与角度比较的关节：左右肘、左右膝
pub const JOINT_TRIPLETS: [JointTriplet; 4] = [
    JointTriplet {
        label: "leftElbow",
        proximal: Joint::LeftShoulder,
        vertex: Joint::LeftElbow,
        distal: Joint::LeftWrist,
    },
    JointTriplet {
        label: "rightElbow",
        proximal: Joint::RightShoulder,
        vertex: Joint::RightElbow,
        distal: Joint::RightWrist,
    },
    JointTriplet {
        label: "leftKnee",
        proximal: Joint::LeftHip,
        vertex: Joint::LeftKnee,
        distal: Joint::LeftAnkle,
    },
    JointTriplet {
        label: "rightKnee",
        proximal: Joint::RightHip,
        vertex: Joint::RightKnee,
        distal: Joint::RightAnkle,
    },
];

/// 单个关节的角度偏差
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JointDeviation {
    pub joint: &'static str,
    pub reference_deg: f64,
    pub live_deg: f64,
    pub difference_deg: f64,
}

/// 计算关节 B 处的夹角（度）
///
/// 任一骨骼向量长度为 0，或余弦值不是有限数（坐标过大导致溢出）时返回 `None`，
/// 由调用方决定替代值。余弦值先截断到 [-1, 1]，浮点误差不会让 `acos` 产生 NaN。
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    let ba = a.planar() - b.planar();
    let bc = c.planar() - b.planar();

    let mag_ba = ba.norm();
    let mag_bc = bc.norm();
    if mag_ba < MIN_BONE_LENGTH || mag_bc < MIN_BONE_LENGTH {
        return None;
    }

    let cos_angle = ba.dot(&bc) / (mag_ba * mag_bc);
    if !cos_angle.is_finite() {
        return None;
    }
    Some(cos_angle.clamp(-1.0, 1.0).acos().to_degrees())
}

/// 三元组在某组关键点上的角度，退化时取 `DEGENERATE_ANGLE_DEG`
pub fn triplet_angle(set: &LandmarkSet, triplet: &JointTriplet) -> f64 {
    joint_angle(
        set.get(triplet.proximal),
        set.get(triplet.vertex),
        set.get(triplet.distal),
    )
    .unwrap_or(DEGENERATE_ANGLE_DEG)
}

/// 逐关节角度偏差，任一输入缺失时返回 `None`
///
/// # Panics
/// 两组关键点使用不同索引方案时 panic。
pub fn joint_deviations(
    reference: Option<&LandmarkSet>,
    live: Option<&LandmarkSet>,
) -> Option<Vec<JointDeviation>> {
    let (reference, live) = (reference?, live?);
    assert_comparable(reference, live);

    let deviations = JOINT_TRIPLETS
        .iter()
        .map(|triplet| {
            let reference_deg = triplet_angle(reference, triplet);
            let live_deg = triplet_angle(live, triplet);
            JointDeviation {
                joint: triplet.label,
                reference_deg,
                live_deg,
                difference_deg: (reference_deg - live_deg).abs(),
            }
        })
        .collect();
    Some(deviations)
}

/// 平均绝对关节角度差（度）
///
/// 任一输入为 `None` 时返回 `f64::INFINITY`。
pub fn angular_similarity(reference: Option<&LandmarkSet>, live: Option<&LandmarkSet>) -> f64 {
    match joint_deviations(reference, live) {
        Some(deviations) => mean_difference(&deviations),
        None => f64::INFINITY,
    }
}

pub(crate) fn mean_difference(deviations: &[JointDeviation]) -> f64 {
    if deviations.is_empty() {
        return 0.0;
    }
    let sum: f64 = deviations.iter().map(|d| d.difference_deg).sum();
    sum / deviations.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LandmarkScheme;
    use crate::testing::standing_pose;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y, 0.0)
    }

    #[test]
    fn overflowing_vectors_are_degenerate() {
        let angle = joint_angle(&lm(1e200, 1e200), &lm(-1e200, 0.0), &lm(1e200, -1e200));
        assert_eq!(angle, None);
    }

    #[test]
    fn straight_limb_is_180() {
        let angle = joint_angle(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn right_angle_is_90() {
        let angle = joint_angle(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn folded_limb_is_0() {
        let angle = joint_angle(&lm(1.0, 0.0), &lm(0.0, 0.0), &lm(2.0, 0.0)).unwrap();
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn depth_is_ignored() {
        let flat = joint_angle(&lm(0.0, 0.0), &lm(0.5, 0.0), &lm(0.5, 0.5)).unwrap();
        let deep = joint_angle(
            &Landmark::new(0.0, 0.0, 0.9),
            &Landmark::new(0.5, 0.0, -0.3),
            &Landmark::new(0.5, 0.5, 0.4),
        )
        .unwrap();
        assert!((flat - deep).abs() < 1e-12);
    }

    #[test]
    fn coincident_landmarks_are_degenerate() {
        let p = lm(0.3, 0.3);
        assert_eq!(joint_angle(&p, &p, &lm(0.6, 0.6)), None);
        assert_eq!(joint_angle(&lm(0.1, 0.1), &p, &p), None);
    }

    #[test]
    fn degenerate_joint_does_not_poison_mean() {
        let reference = standing_pose(LandmarkScheme::BlazePose33);
        let mut points = reference.landmarks().to_vec();
        // 左肩与左肘重合
        points[11] = points[13];
        let live = LandmarkSet::new(LandmarkScheme::BlazePose33, points).unwrap();

        let deviations = joint_deviations(Some(&reference), Some(&live)).unwrap();
        assert_eq!(deviations[0].live_deg, DEGENERATE_ANGLE_DEG);

        let angular = angular_similarity(Some(&reference), Some(&live));
        assert!(angular.is_finite());
        let expected = (triplet_angle(&reference, &JOINT_TRIPLETS[0]) - 180.0).abs() / 4.0;
        assert!((angular - expected).abs() < 1e-9);
    }

    #[test]
    fn identical_sets_have_zero_angular_distance() {
        let set = standing_pose(LandmarkScheme::MoveNet17);
        assert_eq!(angular_similarity(Some(&set), Some(&set)), 0.0);
    }

    #[test]
    fn absence_yields_infinity() {
        let set = standing_pose(LandmarkScheme::BlazePose33);
        assert_eq!(angular_similarity(None, Some(&set)), f64::INFINITY);
        assert_eq!(angular_similarity(Some(&set), None), f64::INFINITY);
        assert!(joint_deviations(Some(&set), None).is_none());
    }

    #[test]
    fn moving_left_elbow_only_affects_left_elbow_triplet() {
        let reference = standing_pose(LandmarkScheme::BlazePose33);
        let mut points = reference.landmarks().to_vec();
        points[13].x += 0.1;
        let live = LandmarkSet::new(LandmarkScheme::BlazePose33, points).unwrap();

        let deviations = joint_deviations(Some(&reference), Some(&live)).unwrap();
        assert_eq!(deviations[0].joint, "leftElbow");
        assert!(deviations[0].difference_deg > 1.0);
        for other in &deviations[1..] {
            assert_eq!(other.difference_deg, 0.0, "{} changed", other.joint);
        }

        let angular = angular_similarity(Some(&reference), Some(&live));
        assert!((angular - deviations[0].difference_deg / 4.0).abs() < 1e-12);
    }
}
