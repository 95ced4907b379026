//! 姿态相似度库
//!
//! 将实时检测到的人体关键点与固定的参考姿态比较，逐帧给出相似度指数。
//! 既可作为 Rust 库被服务端调用，也可编译为 WebAssembly 在浏览器端运行。
//!
//! ## 模块
//! - `landmark`: 关键点、索引方案与关节名映射
//! - `euclidean`: 平均逐点欧氏距离
//! - `angle`: 关节角度与角度相似度
//! - `index`: 综合相似度指数与历史最大距离
//! - `comparator`: 参考姿态生命周期与逐帧比较器
//! - `wasm`: 浏览器端绑定

pub mod angle;
pub mod comparator;
pub mod error;
pub mod euclidean;
pub mod index;
pub mod landmark;
pub mod wasm;

#[cfg(test)]
mod testing;

// 重新导出核心类型，方便外部使用
pub use angle::{angular_similarity, joint_angle, JointDeviation, JOINT_TRIPLETS};
pub use comparator::{FrameOutcome, FrameScore, PoseComparator, PoseDetector, ReferenceState};
pub use error::PoseError;
pub use euclidean::euclidean_similarity;
pub use index::{similarity_index, update_running_max};
pub use landmark::{Joint, Landmark, LandmarkScheme, LandmarkSet, MAX_COORDINATE_ABS};
pub use wasm::WasmPoseComparator;
