//! 逐帧姿态比较器
//!
//! 持有参考姿态的生命周期和历史最大欧氏距离，由调用方拥有，每帧调用一次。
//!
//! 参考姿态状态机：
//! Uninitialized → Detecting → Ready（检测到姿态）
//! Uninitialized → Detecting → Absent（未检测到姿态）
//! 参考姿态一经确定便不再重新检测。

use std::collections::VecDeque;

use serde::Serialize;

use crate::angle::{joint_deviations, mean_difference, JointDeviation};
use crate::error::PoseError;
use crate::euclidean::euclidean_similarity;
use crate::index::{similarity_index, update_running_max};
use crate::landmark::LandmarkSet;

/// 指数历史保留上限
const HISTORY_CAPACITY: usize = 100;

/// 外部姿态检测器
///
/// 给定图像返回关键点，未检测到姿态时返回 `None`。
/// 实现方需保证多次调用之间索引方案一致。
pub trait PoseDetector {
    type Image: ?Sized;

    fn detect(&mut self, image: &Self::Image) -> Option<LandmarkSet>;
}

/// 参考姿态状态
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceState {
    Uninitialized,
    Detecting,
    Ready(LandmarkSet),
    Absent,
}

impl ReferenceState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Detecting => "detecting",
            Self::Ready(_) => "ready",
            Self::Absent => "absent",
        }
    }
}

/// 单帧评分
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameScore {
    /// 已评分帧序号，从 1 开始
    pub frame: u64,
    pub euclidean: f64,
    /// 平均关节角度差（度）
    pub angular: f64,
    pub running_max: f64,
    pub index: f64,
    pub smoothed_index: f64,
    pub joints: Vec<JointDeviation>,
}

/// 单帧比较结果
///
/// 缺失姿态在这里短路，不会把无穷大送进指数公式。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FrameOutcome {
    Scored(FrameScore),
    /// 当前帧未检测到姿态
    NoLivePose,
    /// 参考图像未检测到姿态，比较不可用
    ReferenceUnavailable,
    /// 参考姿态尚未确定
    ReferencePending,
}

impl FrameOutcome {
    pub fn score(&self) -> Option<&FrameScore> {
        match self {
            Self::Scored(score) => Some(score),
            _ => None,
        }
    }
}

/// 姿态比较器
#[derive(Debug, Clone)]
pub struct PoseComparator {
    reference: ReferenceState,
    running_max: f64,
    frames_scored: u64,
    history: VecDeque<f64>,
    smooth_window: usize,
}

impl PoseComparator {
    pub fn new(smooth_window: usize) -> Self {
        Self {
            reference: ReferenceState::Uninitialized,
            running_max: 0.0,
            frames_scored: 0,
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
            smooth_window: smooth_window.max(1),
        }
    }

    /// 以已知的检测结果直接构造（跳过 Detecting 阶段）
    pub fn with_reference(reference: Option<LandmarkSet>, smooth_window: usize) -> Self {
        let mut comparator = Self::new(smooth_window);
        comparator.reference = match reference {
            Some(set) => ReferenceState::Ready(set),
            None => ReferenceState::Absent,
        };
        comparator
    }

    pub fn begin_detection(&mut self) -> Result<(), PoseError> {
        match self.reference {
            ReferenceState::Uninitialized => {
                self.reference = ReferenceState::Detecting;
                Ok(())
            }
            _ => Err(PoseError::ReferenceAlreadyResolved),
        }
    }

    pub fn resolve_reference(&mut self, detected: Option<LandmarkSet>) -> Result<(), PoseError> {
        match self.reference {
            ReferenceState::Detecting => {
                self.reference = match detected {
                    Some(set) => ReferenceState::Ready(set),
                    None => ReferenceState::Absent,
                };
                Ok(())
            }
            ReferenceState::Uninitialized => Err(PoseError::DetectionNotStarted),
            _ => Err(PoseError::ReferenceAlreadyResolved),
        }
    }

    /// 用检测器处理参考图像，一步完成 Detecting → Ready / Absent
    pub fn detect_reference<D: PoseDetector>(
        &mut self,
        detector: &mut D,
        image: &D::Image,
    ) -> Result<&ReferenceState, PoseError> {
        self.begin_detection()?;
        let detected = detector.detect(image);
        self.resolve_reference(detected)?;
        Ok(&self.reference)
    }

    /// 比较一帧
    ///
    /// 先用当前帧欧氏距离更新历史最大值，再做归一化。
    ///
    /// # Panics
    /// 当前帧与参考姿态索引方案不同时 panic，需要容错时使用 `try_compare_frame`。
    pub fn compare_frame(&mut self, live: Option<&LandmarkSet>) -> FrameOutcome {
        let reference = match &self.reference {
            ReferenceState::Ready(set) => set,
            ReferenceState::Absent => return FrameOutcome::ReferenceUnavailable,
            ReferenceState::Uninitialized | ReferenceState::Detecting => {
                return FrameOutcome::ReferencePending
            }
        };
        let Some(live) = live else {
            return FrameOutcome::NoLivePose;
        };

        let euclidean = euclidean_similarity(Some(reference), Some(live));
        self.running_max = update_running_max(euclidean, self.running_max);

        let joints = joint_deviations(Some(reference), Some(live)).unwrap_or_default();
        let angular = mean_difference(&joints);
        let index = similarity_index(euclidean, angular, self.running_max);

        self.frames_scored += 1;
        self.push_history(index);

        FrameOutcome::Scored(FrameScore {
            frame: self.frames_scored,
            euclidean,
            angular,
            running_max: self.running_max,
            index,
            smoothed_index: self.smoothed_index().unwrap_or(index),
            joints,
        })
    }

    /// 与 `compare_frame` 相同，但方案不一致时返回错误而不是 panic
    pub fn try_compare_frame(
        &mut self,
        live: Option<&LandmarkSet>,
    ) -> Result<FrameOutcome, PoseError> {
        if let (ReferenceState::Ready(reference), Some(live)) = (&self.reference, live) {
            reference.check_comparable(live)?;
        }
        Ok(self.compare_frame(live))
    }

    pub fn reference(&self) -> &ReferenceState {
        &self.reference
    }

    pub fn state_name(&self) -> &'static str {
        self.reference.name()
    }

    pub fn running_max(&self) -> f64 {
        self.running_max
    }

    pub fn frames_scored(&self) -> u64 {
        self.frames_scored
    }

    /// 最近 N 帧指数的移动平均，尚无评分时返回 `None`
    pub fn smoothed_index(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let window = self.history.len().min(self.smooth_window);
        let sum: f64 = self.history.iter().rev().take(window).sum();
        Some(sum / window as f64)
    }

    fn push_history(&mut self, index: f64) {
        self.history.push_back(index);
        while self.history.len() > HISTORY_CAPACITY {
            self.history.pop_front();
        }
    }
}
