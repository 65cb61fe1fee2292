use crate::{WarpError, WarpResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 浮点累积误差容限.
const EPS: f64 = 1e-9;

/// 阈值扫描区间 `[min, max]`, 步长 `step`.
///
/// 要求 `0 <= min < max <= 1` 且 `step > 0`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdRange {
    min: f64,
    max: f64,
    step: f64,
}

impl ThresholdRange {
    /// 检查并构造.
    pub fn new(min: f64, max: f64, step: f64) -> WarpResult<Self> {
        let finite = min.is_finite() && max.is_finite() && step.is_finite();
        if !finite || min < 0.0 || min >= max || max > 1.0 || step <= 0.0 {
            return Err(WarpError::InvalidThresholdRange { min, max, step });
        }
        Ok(Self { min, max, step })
    }

    /// 下界.
    #[inline]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 上界.
    #[inline]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// 步长.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// 依次产生 `min, min + step, ...`, 不超过 `max`.
    ///
    /// 第 `i` 个值直接由 `min + i * step` 计算, 不做累加.
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let Self { min, max, step } = *self;
        (0u32..)
            .map(move |i| min + f64::from(i) * step)
            .take_while(move |t| *t <= max + EPS)
            .map(move |t| t.min(max))
    }
}
