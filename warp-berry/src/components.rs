//! 二值图像的连通域标记.
//!
//! 前景像素 (非零) 按给定邻接规则划分连通域, 编号从 `1` 起连续递增, 背景为 `0`.
//! 编号顺序为各连通域在行优先扫描中首次出现的顺序.

use std::collections::VecDeque;

use either::Either;
use ndarray::{Array2, ArrayView2};

use crate::consts::gray::is_foreground;
use crate::data::PosIter;
use crate::neighbour::{neighbour4, neighbour8};
use crate::Idx2d;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 像素邻接规则.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Adjacency {
    /// 上下左右.
    Four,

    /// 上下左右加四个对角.
    Eight,
}

impl Adjacency {
    /// 对偶邻接规则. 前景与背景总是使用一对对偶规则.
    #[inline]
    pub fn dual(self) -> Self {
        match self {
            Self::Four => Self::Eight,
            Self::Eight => Self::Four,
        }
    }

    /// `pos` 的邻居索引, 不检查越界.
    #[inline]
    pub(crate) fn neighbours(self, pos: Idx2d) -> impl Iterator<Item = Idx2d> {
        match self {
            Self::Four => Either::Left(neighbour4(pos).into_iter()),
            Self::Eight => Either::Right(neighbour8(pos).into_iter()),
        }
    }
}

/// 一次连通域标记的结果.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMap {
    labels: Array2<u32>,
    count: u32,
}

impl ComponentMap {
    /// 编号图像.
    #[inline]
    pub fn labels(&self) -> ArrayView2<u32> {
        self.labels.view()
    }

    /// 前景连通域个数.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// 给定位置的编号. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<u32> {
        self.labels.get(pos).copied()
    }

    /// 取出编号图像.
    #[inline]
    pub fn into_raw(self) -> Array2<u32> {
        self.labels
    }
}

/// 可复用的连通域标记器.
///
/// 反复在同样大小的小图 (例如 3×3 邻域) 上调用时不会重新分配内存.
#[derive(Debug, Default)]
pub struct ComponentLabeler {
    labels: Array2<u32>,
    queue: VecDeque<Idx2d>,
    count: u32,
}

impl ComponentLabeler {
    /// 空标记器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记 `img`, 返回前景连通域个数. 结果通过 [`Self::labels`] 读取.
    pub fn run(&mut self, img: ArrayView2<u8>, adj: Adjacency) -> u32 {
        if self.labels.dim() == img.dim() {
            self.labels.fill(0);
        } else {
            self.labels = Array2::zeros(img.dim());
        }
        self.queue.clear();
        self.count = 0;

        for pos in PosIter::new(img.dim()) {
            if !is_foreground(img[pos]) || self.labels[pos] != 0 {
                continue;
            }
            self.count += 1;
            self.labels[pos] = self.count;
            self.queue.push_back(pos);

            // bfs
            while let Some(cur) = self.queue.pop_front() {
                for nb in adj.neighbours(cur) {
                    if matches!(img.get(nb), Some(&p) if is_foreground(p)) && self.labels[nb] == 0 {
                        self.labels[nb] = self.count;
                        self.queue.push_back(nb);
                    }
                }
            }
        }
        self.count
    }

    /// 最近一次标记的编号图像.
    #[inline]
    pub fn labels(&self) -> ArrayView2<u32> {
        self.labels.view()
    }

    /// 最近一次标记得到的连通域个数.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// 转换为不可变结果.
    #[inline]
    pub fn into_map(self) -> ComponentMap {
        ComponentMap {
            labels: self.labels,
            count: self.count,
        }
    }
}

/// 标记 `img` 的前景连通域. 不修改输入, 空图像与全背景图像得到 `0` 个连通域.
pub fn label(img: ArrayView2<u8>, adj: Adjacency) -> ComponentMap {
    let mut labeler = ComponentLabeler::new();
    labeler.run(img, adj);
    labeler.into_map()
}

/// 前景连通域个数.
#[inline]
pub fn count_components(img: ArrayView2<u8>, adj: Adjacency) -> usize {
    label(img, adj).count() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_degenerate_inputs() {
        let empty = Array2::<u8>::zeros((0, 0));
        assert_eq!(count_components(empty.view(), Adjacency::Four), 0);
        let flat = Array2::<u8>::zeros((0, 5));
        assert_eq!(count_components(flat.view(), Adjacency::Eight), 0);

        let single = array![[1u8]];
        let map = label(single.view(), Adjacency::Four);
        assert_eq!(map.count(), 1);
        assert_eq!(map.get((0, 0)), Some(1));

        let bg = Array2::<u8>::zeros((4, 4));
        assert_eq!(count_components(bg.view(), Adjacency::Eight), 0);
    }

    #[test]
    fn test_diagonal_pixels() {
        let img = array![[1u8, 0, 0], [0, 1, 0], [0, 0, 1]];
        assert_eq!(count_components(img.view(), Adjacency::Four), 3);
        assert_eq!(count_components(img.view(), Adjacency::Eight), 1);
    }

    #[test]
    fn test_ids_consecutive_in_scan_order() {
        let img = array![[0u8, 1, 0, 1], [0, 1, 0, 0], [1, 0, 0, 1]];
        let map = label(img.view(), Adjacency::Four);
        assert_eq!(map.count(), 4);
        assert_eq!(
            map.labels(),
            array![[0u32, 1, 0, 2], [0, 1, 0, 0], [3, 0, 0, 4]].view()
        );
        // 输入未被修改.
        assert_eq!(img[(0, 1)], 1);
    }

    #[test]
    fn test_ring() {
        let img = array![
            [1u8, 1, 1, 1],
            [1, 0, 0, 1],
            [1, 0, 0, 1],
            [1, 1, 1, 1],
        ];
        assert_eq!(count_components(img.view(), Adjacency::Four), 1);
        // 背景: 补图中内部 2×2 是一个连通域.
        let complement = img.mapv(|p| 1 - p);
        assert_eq!(count_components(complement.view(), Adjacency::Eight), 1);
    }

    #[test]
    fn test_labeler_reuse() {
        let mut labeler = ComponentLabeler::new();
        let a = array![[1u8, 0, 1], [0, 0, 0], [1, 0, 1]];
        assert_eq!(labeler.run(a.view(), Adjacency::Four), 4);
        let b = array![[1u8, 1, 1], [0, 0, 0], [0, 0, 0]];
        assert_eq!(labeler.run(b.view(), Adjacency::Four), 1);
        assert_eq!(labeler.labels()[(2, 2)], 0);
        let c = array![[1u8, 1], [1, 1]];
        assert_eq!(labeler.run(c.view(), Adjacency::Eight), 1);
        assert_eq!(labeler.labels().dim(), (2, 2));
    }

    #[test]
    fn test_dual() {
        assert_eq!(Adjacency::Four.dual(), Adjacency::Eight);
        assert_eq!(Adjacency::Eight.dual(), Adjacency::Four);
    }
}
