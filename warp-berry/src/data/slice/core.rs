use super::PosIter;
use crate::consts::gray::{BACKGROUND, FOREGROUND};
use crate::Idx2d;
use ndarray::{Array2, ArrayView2};
use std::ops::Index;

/// 把 `f32` 像素二值化的规则.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Binarization {
    /// 大于 0 为前景, 负值视为背景. 用于真值标签与掩膜.
    Positive,

    /// 严格大于阈值为前景. 用于概率图.
    Above(f64),
}

impl Binarization {
    /// 像素 `v` 是否为前景.
    #[inline]
    pub fn is_foreground(self, v: f32) -> bool {
        match self {
            Self::Positive => v > 0.0,
            Self::Above(t) => f64::from(v) > t,
        }
    }

    /// 像素 `v` 的二值结果.
    #[inline]
    pub fn apply(self, v: f32) -> u8 {
        if self.is_foreground(v) {
            FOREGROUND
        } else {
            BACKGROUND
        }
    }
}

/// 不可变、借用的二维切片.
#[derive(Debug, Clone, Copy)]
pub struct LabelSlice<'a> {
    /// 底层数据的轻量级视图, 借用于 [`crate::LabelStack`].
    data: ArrayView2<'a, f32>,
}

/// 拥有所有权的二维切片, 可以跨线程移动.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedLabelSlice {
    data: Array2<f32>,
}

impl<'a> LabelSlice<'a> {
    /// 直接初始化.
    #[inline]
    pub fn new(data: ArrayView2<'a, f32>) -> Self {
        Self { data }
    }

    /// 复制为拥有所有权的切片.
    #[inline]
    pub fn to_owned_slice(&self) -> OwnedLabelSlice {
        OwnedLabelSlice::new(self.data.to_owned())
    }
}

impl OwnedLabelSlice {
    /// 直接初始化.
    #[inline]
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// 借用为不可变切片.
    #[inline]
    pub fn as_slice(&self) -> LabelSlice {
        LabelSlice::new(self.data.view())
    }

    /// 取出底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<f32> {
        self.data
    }
}

impl From<Array2<f32>> for OwnedLabelSlice {
    #[inline]
    fn from(data: Array2<f32>) -> Self {
        Self::new(data)
    }
}

/// 不可变方法集合.
macro_rules! impl_slice_immut {
    ($slice: ty) => {
        /// 不可变方法集合.
        impl $slice {
            /// 获得 **底层** 数据的一份不可变 shallow copy.
            #[inline]
            pub fn array_view(&self) -> ArrayView2<f32> {
                self.data.view()
            }

            /// 切片形状 `(h, w)`.
            #[inline]
            pub fn shape(&self) -> Idx2d {
                self.data.dim()
            }

            /// 切片高度.
            #[inline]
            pub fn height(&self) -> usize {
                self.shape().0
            }

            /// 切片宽度.
            #[inline]
            pub fn width(&self) -> usize {
                self.shape().1
            }

            /// 像素个数.
            #[inline]
            pub fn size(&self) -> usize {
                self.data.len()
            }

            /// 获取给定位置 (高, 宽) 的像素值. 越界时返回 `None`.
            #[inline]
            pub fn get(&self, pos: Idx2d) -> Option<f32> {
                self.data.get(pos).copied()
            }

            /// 行优先的全部索引.
            #[inline]
            pub fn pos_iter(&self) -> PosIter {
                PosIter::new(self.shape())
            }

            /// 按 `rule` 二值化, 得到 `0/1` 图像.
            pub fn binarize(&self, rule: Binarization) -> Array2<u8> {
                self.data.mapv(|v| rule.apply(v))
            }

            /// 按 `rule` 统计前景像素个数.
            pub fn count_foreground(&self, rule: Binarization) -> usize {
                self.data.iter().filter(|v| rule.is_foreground(**v)).count()
            }
        }

        impl Index<Idx2d> for $slice {
            type Output = f32;

            #[inline]
            fn index(&self, index: Idx2d) -> &Self::Output {
                &self.data[index]
            }
        }
    };
}

impl_slice_immut!(LabelSlice<'_>);
impl_slice_immut!(OwnedLabelSlice);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_binarization_rules() {
        assert!(Binarization::Positive.is_foreground(0.1));
        assert!(!Binarization::Positive.is_foreground(-1.0));
        assert!(!Binarization::Positive.is_foreground(0.0));

        // 严格大于.
        assert!(!Binarization::Above(0.5).is_foreground(0.5));
        assert!(Binarization::Above(0.5).is_foreground(0.51));
        assert!(Binarization::Above(0.0).is_foreground(1e-6));
    }

    #[test]
    fn test_binarize_slice() {
        let owned = OwnedLabelSlice::new(array![[0.2f32, 0.7], [0.5, 0.9]]);
        let slice = owned.as_slice();
        assert_eq!(slice.shape(), (2, 2));
        assert_eq!(
            slice.binarize(Binarization::Above(0.5)),
            array![[0u8, 1], [0, 1]]
        );
        assert_eq!(slice.binarize(Binarization::Positive), array![[1u8, 1], [1, 1]]);
        assert_eq!(slice.count_foreground(Binarization::Above(0.6)), 2);
        assert_eq!(slice.get((2, 0)), None);
        assert_eq!(owned[(1, 1)], 0.9);
    }
}
