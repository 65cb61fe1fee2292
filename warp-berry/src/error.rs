use crate::data::StackRole;
use crate::Idx3d;

/// 评估过程中可能出现的错误.
///
/// 不收敛不是错误: warping 在没有进展时正常终止.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WarpError {
    /// 输入栈形状与 reference 不一致.
    #[error("{role} shape {found:?} does not match reference shape {expected:?}")]
    ShapeMismatch {
        /// 出错的输入.
        role: StackRole,
        /// reference 的形状.
        expected: Idx3d,
        /// 实际形状.
        found: Idx3d,
    },

    /// 由切片列表构造栈时, 各切片形状不一致.
    #[error("slices do not share one shape")]
    RaggedSlices,

    /// 二值化阈值不在 `[0, 1]` 内.
    #[error("threshold {0} is outside [0, 1]")]
    InvalidThreshold(f64),

    /// 阈值扫描区间非法.
    #[error("invalid threshold range: min = {min}, max = {max}, step = {step}")]
    InvalidThresholdRange {
        /// 下界.
        min: f64,
        /// 上界.
        max: f64,
        /// 步长.
        step: f64,
    },

    /// 某个切片任务失败, 且失败策略为 `Abort`.
    #[error("slice {index} failed: {message}")]
    SliceFailed {
        /// 切片序号.
        index: usize,
        /// 失败原因.
        message: String,
    },
}

/// 本 crate 的通用返回类型.
pub type WarpResult<T> = Result<T, WarpError>;

/// 检查单个阈值.
pub(crate) fn check_threshold(threshold: f64) -> WarpResult<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(WarpError::InvalidThreshold(threshold))
    }
}
