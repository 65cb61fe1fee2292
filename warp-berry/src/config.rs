//! 评估参数.

use crate::consts::SIMPLE_POINT_THRESHOLD;
use crate::driver::cpus;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 分类 "试翻转" 时重新标记连通域的范围.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClassifyRadius {
    /// 以错误点为中心, 边长 `2r + 1` 的窗口. 窗口越界部分视为背景.
    /// `Local(0)` 与 [`Self::WholeSlice`] 相同.
    Local(usize),

    /// 整张切片.
    WholeSlice,
}

impl Default for ClassifyRadius {
    /// 3×3 窗口.
    fn default() -> Self {
        Self::Local(1)
    }
}

/// 切片任务失败 (panic) 时的处理方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// 记录日志, 失败切片对各项累加值贡献 `0`, 但仍计入切片数.
    #[default]
    Degrade,

    /// 整个调用返回 [`crate::WarpError::SliceFailed`].
    Abort,
}

/// 评估入口共享的参数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricConfig {
    /// 错误点权重必须严格大于该值才允许翻转.
    pub simple_point_threshold: f64,

    /// 分类时试翻转的重新标记范围.
    pub classify_radius: ClassifyRadius,

    /// 线程池大小, 至少为 1.
    pub workers: usize,

    /// 切片任务失败时的处理方式.
    pub failure_policy: FailurePolicy,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            simple_point_threshold: SIMPLE_POINT_THRESHOLD,
            classify_radius: ClassifyRadius::default(),
            workers: cpus(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl MetricConfig {
    /// 设置 simple point 权重阈值.
    pub fn with_simple_point_threshold(mut self, threshold: f64) -> Self {
        self.simple_point_threshold = threshold;
        self
    }

    /// 设置分类试翻转范围.
    pub fn with_classify_radius(mut self, radius: ClassifyRadius) -> Self {
        self.classify_radius = radius;
        self
    }

    /// 设置线程数. `0` 视为 `1`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// 设置失败策略.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}
