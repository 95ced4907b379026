//! 人体关键点数据模型
//!
//! `LandmarkSet` 是外部姿态检测器的输出契约：按固定索引方案排列的
//! 三维归一化坐标点。索引方案以 `LandmarkScheme` 显式携带，
//! 语义关节名通过 `Joint` 查表映射到具体索引，避免在比较逻辑中硬编码数字。

use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// 坐标绝对值上限，超出则拒绝（归一化坐标远小于此值，平方后也不会溢出）
pub const MAX_COORDINATE_ABS: f64 = 1e6;

/// 单个关键点（归一化坐标）
///
/// x, y 通常位于 [0, 1]（相对图像），z 为相对深度，大致位于 [-1, 1]。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 三维欧氏距离
    pub fn distance(&self, other: &Landmark) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2))
            .sqrt()
    }

    /// 投影到 x,y 平面（角度计算忽略深度）
    pub fn planar(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn within(&self, limit: f64) -> bool {
        self.x.abs() <= limit && self.y.abs() <= limit && self.z.abs() <= limit
    }
}

/// 二维点 / 向量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// 关键点索引方案
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkScheme {
    /// MediaPipe Pose (BlazePose)，33 个关键点
    #[serde(rename = "blazepose33")]
    BlazePose33,
    /// MoveNet，17 个关键点
    #[serde(rename = "movenet17")]
    MoveNet17,
}

impl LandmarkScheme {
    pub fn len(self) -> usize {
        match self {
            Self::BlazePose33 => 33,
            Self::MoveNet17 => 17,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BlazePose33 => "blazepose33",
            Self::MoveNet17 => "movenet17",
        }
    }

    /// 语义关节名 → 方案内索引
    pub fn index_of(self, joint: Joint) -> usize {
        match self {
            Self::BlazePose33 => match joint {
                Joint::LeftShoulder => 11,
                Joint::RightShoulder => 12,
                Joint::LeftElbow => 13,
                Joint::RightElbow => 14,
                Joint::LeftWrist => 15,
                Joint::RightWrist => 16,
                Joint::LeftHip => 23,
                Joint::RightHip => 24,
                Joint::LeftKnee => 25,
                Joint::RightKnee => 26,
                Joint::LeftAnkle => 27,
                Joint::RightAnkle => 28,
            },
            Self::MoveNet17 => match joint {
                Joint::LeftShoulder => 5,
                Joint::RightShoulder => 6,
                Joint::LeftElbow => 7,
                Joint::RightElbow => 8,
                Joint::LeftWrist => 9,
                Joint::RightWrist => 10,
                Joint::LeftHip => 11,
                Joint::RightHip => 12,
                Joint::LeftKnee => 13,
                Joint::RightKnee => 14,
                Joint::LeftAnkle => 15,
                Joint::RightAnkle => 16,
            },
        }
    }
}

impl fmt::Display for LandmarkScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkScheme {
    type Err = PoseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blazepose33" | "blazepose" | "mediapipe" => Ok(Self::BlazePose33),
            "movenet17" | "movenet" => Ok(Self::MoveNet17),
            other => Err(PoseError::UnknownScheme(other.to_string())),
        }
    }
}

/// 参与角度比较的解剖学关节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Joint {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// 一帧姿态的全部关键点
///
/// 构造时校验长度与方案一致、坐标有限，因此任何 `LandmarkSet` 都是非空且自洽的。
/// “未检测到姿态”用 `Option<&LandmarkSet>` 的 `None` 表示，而不是空集合。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLandmarkSet")]
pub struct LandmarkSet {
    scheme: LandmarkScheme,
    landmarks: Vec<Landmark>,
}

/// 反序列化中间表示，经 `LandmarkSet::new` 校验后才成为 `LandmarkSet`
#[derive(Deserialize)]
struct RawLandmarkSet {
    scheme: LandmarkScheme,
    landmarks: Vec<Landmark>,
}

impl TryFrom<RawLandmarkSet> for LandmarkSet {
    type Error = PoseError;

    fn try_from(raw: RawLandmarkSet) -> Result<Self, Self::Error> {
        LandmarkSet::new(raw.scheme, raw.landmarks)
    }
}

impl LandmarkSet {
    pub fn new(scheme: LandmarkScheme, landmarks: Vec<Landmark>) -> Result<Self, PoseError> {
        if landmarks.len() != scheme.len() {
            return Err(PoseError::LandmarkCount {
                scheme,
                expected: scheme.len(),
                actual: landmarks.len(),
            });
        }
        if let Some(index) = landmarks.iter().position(|lm| !lm.is_finite()) {
            return Err(PoseError::NonFiniteCoordinate { index });
        }
        if let Some(index) = landmarks
            .iter()
            .position(|lm| !lm.within(MAX_COORDINATE_ABS))
        {
            return Err(PoseError::CoordinateOutOfRange {
                index,
                limit: MAX_COORDINATE_ABS,
            });
        }
        Ok(Self { scheme, landmarks })
    }

    /// 从扁平数组构造，按 x, y, z 三元组排列
    pub fn from_flat(scheme: LandmarkScheme, flat: &[f64]) -> Result<Self, PoseError> {
        if flat.len() % 3 != 0 {
            return Err(PoseError::FlatLength(flat.len()));
        }
        let landmarks = flat
            .chunks_exact(3)
            .map(|c| Landmark::new(c[0], c[1], c[2]))
            .collect();
        Self::new(scheme, landmarks)
    }

    pub fn scheme(&self) -> LandmarkScheme {
        self.scheme
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, joint: Joint) -> &Landmark {
        &self.landmarks[self.scheme.index_of(joint)]
    }

    /// 校验两组关键点可以互相比较
    pub fn check_comparable(&self, other: &LandmarkSet) -> Result<(), PoseError> {
        if self.scheme != other.scheme {
            return Err(PoseError::SchemeMismatch {
                reference: self.scheme,
                live: other.scheme,
            });
        }
        Ok(())
    }
}

/// 方案不一致属于配置错误，直接 panic
pub(crate) fn assert_comparable(reference: &LandmarkSet, live: &LandmarkSet) {
    if let Err(e) = reference.check_comparable(live) {
        panic!("cannot compare landmark sets: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = LandmarkSet::new(LandmarkScheme::MoveNet17, vec![Landmark::default(); 33])
            .unwrap_err();
        assert_eq!(
            err,
            PoseError::LandmarkCount {
                scheme: LandmarkScheme::MoveNet17,
                expected: 17,
                actual: 33,
            }
        );
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut points = vec![Landmark::default(); 17];
        points[4].z = f64::NAN;
        let err = LandmarkSet::new(LandmarkScheme::MoveNet17, points).unwrap_err();
        assert_eq!(err, PoseError::NonFiniteCoordinate { index: 4 });
    }

    #[test]
    fn point_subtraction() {
        let v = Point::new(0.5, 0.25) - Point::new(0.25, 0.5);
        assert_eq!(v, Point::new(0.25, -0.25));
        assert_eq!(v.norm(), (0.125_f64).sqrt());
    }

    #[test]
    fn rejects_huge_coordinates() {
        let points = vec![Landmark::new(1e200, 1e200, 0.0); 17];
        let err = LandmarkSet::new(LandmarkScheme::MoveNet17, points).unwrap_err();
        assert_eq!(
            err,
            PoseError::CoordinateOutOfRange {
                index: 0,
                limit: MAX_COORDINATE_ABS,
            }
        );

        let mut points = vec![Landmark::default(); 17];
        points[3].y = -MAX_COORDINATE_ABS;
        assert!(LandmarkSet::new(LandmarkScheme::MoveNet17, points).is_ok());
    }

    #[test]
    fn flat_buffer_must_be_triples() {
        let err = LandmarkSet::from_flat(LandmarkScheme::MoveNet17, &[0.0; 50]).unwrap_err();
        assert_eq!(err, PoseError::FlatLength(50));
    }

    #[test]
    fn flat_buffer_is_read_as_xyz() {
        let mut flat = vec![0.0; 17 * 3];
        flat[7 * 3] = 0.4;
        flat[7 * 3 + 1] = 0.5;
        flat[7 * 3 + 2] = -0.1;
        let set = LandmarkSet::from_flat(LandmarkScheme::MoveNet17, &flat).unwrap();
        assert_eq!(*set.get(Joint::LeftElbow), Landmark::new(0.4, 0.5, -0.1));
    }

    #[test]
    fn blazepose_indices_follow_mediapipe() {
        let s = LandmarkScheme::BlazePose33;
        assert_eq!(s.index_of(Joint::LeftShoulder), 11);
        assert_eq!(s.index_of(Joint::LeftElbow), 13);
        assert_eq!(s.index_of(Joint::LeftWrist), 15);
        assert_eq!(s.index_of(Joint::RightAnkle), 28);
    }

    #[test]
    fn scheme_parses_aliases() {
        assert_eq!("MediaPipe".parse::<LandmarkScheme>().unwrap(), LandmarkScheme::BlazePose33);
        assert_eq!("movenet".parse::<LandmarkScheme>().unwrap(), LandmarkScheme::MoveNet17);
        assert!("openpose".parse::<LandmarkScheme>().is_err());
    }

    #[test]
    fn mismatched_schemes_are_not_comparable() {
        let a = LandmarkSet::new(LandmarkScheme::MoveNet17, vec![Landmark::default(); 17]).unwrap();
        let b =
            LandmarkSet::new(LandmarkScheme::BlazePose33, vec![Landmark::default(); 33]).unwrap();
        assert!(matches!(
            a.check_comparable(&b),
            Err(PoseError::SchemeMismatch { .. })
        ));
    }
}
