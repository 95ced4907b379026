//! 浏览器端绑定
//!
//! 页面在本地运行姿态检测（如 MediaPipe Pose），把关键点以扁平
//! `Float64Array`（x, y, z 三元组）传入，直接在 WASM 中完成逐帧评分。

use wasm_bindgen::prelude::*;

use crate::angle::joint_angle;
use crate::comparator::PoseComparator;
use crate::landmark::{Landmark, LandmarkScheme, LandmarkSet};

/// 姿态比较器的 JS 包装
///
/// 构造后处于 Detecting 状态，等待页面对参考图像运行检测后调用
/// `setReference` 或 `markReferenceAbsent`。
#[wasm_bindgen]
pub struct WasmPoseComparator {
    scheme: LandmarkScheme,
    inner: PoseComparator,
}

#[wasm_bindgen]
impl WasmPoseComparator {
    /// # 参数
    /// - `scheme`: 关键点方案，"blazepose33" 或 "movenet17"
    /// - `smooth_window`: 指数平滑窗口，推荐 5
    #[wasm_bindgen(constructor)]
    pub fn new(scheme: &str, smooth_window: usize) -> Result<WasmPoseComparator, JsError> {
        let scheme = scheme.parse::<LandmarkScheme>()?;
        let mut inner = PoseComparator::new(smooth_window);
        inner.begin_detection()?;
        Ok(Self { scheme, inner })
    }

    /// 设置参考姿态（只能设置一次）
    #[wasm_bindgen(js_name = "setReference")]
    pub fn set_reference(&mut self, landmarks: &[f64]) -> Result<(), JsError> {
        let set = LandmarkSet::from_flat(self.scheme, landmarks)?;
        self.inner.resolve_reference(Some(set))?;
        Ok(())
    }

    /// 参考图像未检测到姿态
    #[wasm_bindgen(js_name = "markReferenceAbsent")]
    pub fn mark_reference_absent(&mut self) -> Result<(), JsError> {
        self.inner.resolve_reference(None)?;
        Ok(())
    }

    /// 比较一帧，返回序列化后的 FrameOutcome
    pub fn compare(&mut self, landmarks: &[f64]) -> Result<JsValue, JsError> {
        let live = LandmarkSet::from_flat(self.scheme, landmarks)?;
        let outcome = self.inner.try_compare_frame(Some(&live))?;
        Ok(serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL))
    }

    /// 当前帧未检测到姿态
    #[wasm_bindgen(js_name = "compareMissing")]
    pub fn compare_missing(&mut self) -> JsValue {
        let outcome = self.inner.compare_frame(None);
        serde_wasm_bindgen::to_value(&outcome).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen(js_name = "getRunningMax")]
    pub fn get_running_max(&self) -> f64 {
        self.inner.running_max()
    }

    #[wasm_bindgen(js_name = "getSmoothedIndex")]
    pub fn get_smoothed_index(&self) -> Option<f64> {
        self.inner.smoothed_index()
    }

    #[wasm_bindgen(js_name = "getFramesScored")]
    pub fn get_frames_scored(&self) -> usize {
        self.inner.frames_scored() as usize
    }

    #[wasm_bindgen(js_name = "getState")]
    pub fn get_state(&self) -> String {
        self.inner.state_name().to_string()
    }
}

/// 二维关节角（度），退化输入返回 NaN
#[wasm_bindgen(js_name = "jointAngle")]
pub fn joint_angle_js(ax: f64, ay: f64, bx: f64, by: f64, cx: f64, cy: f64) -> f64 {
    joint_angle(
        &Landmark::new(ax, ay, 0.0),
        &Landmark::new(bx, by, 0.0),
        &Landmark::new(cx, cy, 0.0),
    )
    .unwrap_or(f64::NAN)
}
