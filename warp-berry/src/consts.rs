//! 通用常量.

/// 二值图像像素值.
pub mod gray {
    /// 二值化后背景的像素值.
    pub const BACKGROUND: u8 = 0;

    /// 二值化后前景的像素值.
    pub const FOREGROUND: u8 = 1;

    /// 像素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p != BACKGROUND
    }

    /// 像素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }
}

/// 默认 simple point 权重阈值. 权重必须 **严格大于** 它才允许翻转.
pub const SIMPLE_POINT_THRESHOLD: f64 = 0.0;

/// 默认二值化阈值.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// 与旧接口对接时使用的 "未计算" 哨兵值. 本 crate 内部以 `None` 表达.
pub const NOT_COMPUTED: f64 = -1.0;

/// 像素类型.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ElemType {
    /// `gray::BACKGROUND`, 代表背景.
    Background,

    /// `gray::FOREGROUND`, 代表前景.
    Foreground,
}

impl ElemType {
    /// 由二值像素构造.
    #[inline]
    pub const fn of(p: u8) -> Self {
        if gray::is_foreground(p) {
            Self::Foreground
        } else {
            Self::Background
        }
    }

    /// 是否为前景.
    #[inline]
    pub fn is_foreground(&self) -> bool {
        matches!(self, Self::Foreground)
    }

    /// 是否为背景.
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.is_foreground()
    }
}
