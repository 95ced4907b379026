//! 核心错误类型
//!
//! 数值边界情况（未检测到姿态、退化角度）不走错误通道，
//! 而是由各计算函数返回约定的哨兵值；这里只收录结构性错误。

use thiserror::Error;

use crate::landmark::LandmarkScheme;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    #[error("landmark count mismatch for {scheme}: expected {expected}, got {actual}")]
    LandmarkCount {
        scheme: LandmarkScheme,
        expected: usize,
        actual: usize,
    },
    #[error("flat landmark buffer length {0} is not a multiple of 3")]
    FlatLength(usize),
    #[error("landmark {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("landmark {index} has a coordinate outside ±{limit}")]
    CoordinateOutOfRange { index: usize, limit: f64 },
    #[error("landmark scheme mismatch: reference={reference}, live={live}")]
    SchemeMismatch {
        reference: LandmarkScheme,
        live: LandmarkScheme,
    },
    #[error("unknown landmark scheme: {0}")]
    UnknownScheme(String),
    #[error("reference pose already resolved")]
    ReferenceAlreadyResolved,
    #[error("reference detection has not started")]
    DetectionNotStarted,
}
