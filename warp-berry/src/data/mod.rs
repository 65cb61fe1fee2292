use std::fmt;
use std::ops::Index;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use num::ToPrimitive;

use crate::{Idx2d, Idx3d, WarpError, WarpResult};

pub mod slice;

pub use slice::{Binarization, LabelSlice, OwnedLabelSlice, PosIter};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 参与评估的三类输入栈.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StackRole {
    /// 真值标签, 其余输入都以它的形状为准.
    Reference,

    /// 模型输出的概率图.
    Proposal,

    /// 可选掩膜, 大于 0 的像素参与计算.
    Mask,
}

impl fmt::Display for StackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reference => "reference",
            Self::Proposal => "proposal",
            Self::Mask => "mask",
        };
        f.write_str(name)
    }
}

/// 按 `(z, h, w)` 排列的二维切片栈. 像素值以 `f32` 保存.
///
/// 真值标签, 概率图与掩膜都用它表达. 切片之间互相独立.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelStack {
    data: Array3<f32>,
}

impl LabelStack {
    /// 直接初始化.
    #[inline]
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// 从任意数值类型的三维数组构造. 无法转换为 `f32` 的值视为背景 `0`.
    pub fn from_view<T: ToPrimitive + Clone>(view: ArrayView3<T>) -> Self {
        Self::new(view.mapv(|v| v.to_f32().unwrap_or(0.0)))
    }

    /// 只有一张切片的栈.
    pub fn from_slice(slice: Array2<f32>) -> Self {
        Self::new(slice.insert_axis(Axis(0)))
    }

    /// 由若干同形状切片构造. 空列表得到空栈.
    pub fn from_slices(slices: &[Array2<f32>]) -> WarpResult<Self> {
        let Some(first) = slices.first() else {
            return Ok(Self::new(Array3::zeros((0, 0, 0))));
        };
        if slices.iter().any(|s| s.dim() != first.dim()) {
            return Err(WarpError::RaggedSlices);
        }
        let views: Vec<ArrayView2<f32>> = slices.iter().map(|s| s.view()).collect();
        ndarray::stack(Axis(0), &views)
            .map(Self::new)
            .map_err(|_| WarpError::RaggedSlices)
    }

    /// 获得 **底层** 数据的一份不可变 shallow copy.
    #[inline]
    pub fn array_view(&self) -> ArrayView3<f32> {
        self.data.view()
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取水平切片形状大小.
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取像素总数.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 是否没有任何切片.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len_z() == 0
    }

    /// 获取第 `z` 张切片. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z: usize) -> LabelSlice {
        LabelSlice::new(self.data.index_axis(Axis(0), z))
    }

    /// 按 `z` 递增顺序迭代所有切片.
    pub fn slice_iter(&self) -> impl Iterator<Item = LabelSlice<'_>> + '_ {
        self.data.axis_iter(Axis(0)).map(LabelSlice::new)
    }

    /// 复制出所有切片. 多线程任务需要拥有各自的输入.
    pub fn to_owned_slices(&self) -> Vec<OwnedLabelSlice> {
        self.slice_iter().map(|s| s.to_owned_slice()).collect()
    }

    /// 检查 `other` 是否与 `self` 同形状, `role` 用于报告错误.
    pub fn check_same_shape(&self, other: &Self, role: StackRole) -> WarpResult<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(WarpError::ShapeMismatch {
                role,
                expected: self.shape(),
                found: other.shape(),
            })
        }
    }
}

impl Index<Idx3d> for LabelStack {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<f32>> for LabelStack {
    #[inline]
    fn from(data: Array3<f32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_from_view_integers() {
        let raw = Array3::<u8>::from_elem((2, 3, 4), 7);
        let stack = LabelStack::from_view(raw.view());
        assert_eq!(stack.shape(), (2, 3, 4));
        assert_eq!(stack.slice_shape(), (3, 4));
        assert_eq!(stack.size(), 24);
        assert_eq!(stack[(1, 2, 3)], 7.0);
    }

    #[test]
    fn test_from_slices() {
        let a = array![[0.0f32, 1.0], [1.0, 0.0]];
        let b = array![[0.5f32, 0.5], [0.0, 0.25]];
        let stack = LabelStack::from_slices(&[a.clone(), b]).unwrap();
        assert_eq!(stack.len_z(), 2);
        assert_eq!(stack.slice_at(0).array_view(), a.view());
        assert_eq!(stack[(1, 1, 1)], 0.25);

        let ragged = LabelStack::from_slices(&[a, Array2::zeros((3, 2))]);
        assert_eq!(ragged, Err(WarpError::RaggedSlices));

        let empty = LabelStack::from_slices(&[]).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_slice_iter_order() {
        let mut raw = Array3::<f32>::zeros((3, 2, 2));
        for z in 0..3 {
            raw[(z, 0, 0)] = z as f32;
        }
        let stack = LabelStack::new(raw);
        let firsts: Vec<f32> = stack.slice_iter().map(|s| s[(0, 0)]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0]);
        assert_eq!(stack.to_owned_slices().len(), 3);
    }

    #[test]
    fn test_check_same_shape() {
        let a = LabelStack::new(Array3::zeros((1, 4, 4)));
        let b = LabelStack::new(Array3::zeros((1, 4, 5)));
        assert!(a.check_same_shape(&a.clone(), StackRole::Proposal).is_ok());
        let err = a.check_same_shape(&b, StackRole::Mask).unwrap_err();
        assert_eq!(
            err,
            WarpError::ShapeMismatch {
                role: StackRole::Mask,
                expected: (1, 4, 4),
                found: (1, 4, 5),
            }
        );
        assert!(err.to_string().starts_with("mask shape"));
    }
}
