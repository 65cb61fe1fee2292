//! 二维 simple point 判定.
//!
//! 默认前景使用 4-邻接, 背景使用 8-邻接. 像素 `p` 是 simple point 当且仅当
//! `T4(p) == 1 && T8(p̄) == 1`:
//!
//! - `T4(p)`: 去掉中心后, 3×3 邻域中前景的 4-连通域里, 与中心 4-相邻的个数;
//! - `T8(p̄)`: 去掉中心后, 3×3 邻域中背景的 8-连通域个数.
//!
//! 结果与中心像素本身的取值无关, 翻转 simple point 不改变前景和背景的连通域个数.

use ndarray::{Array2, ArrayView2};

use crate::components::{Adjacency, ComponentLabeler};
use crate::consts::gray::{is_foreground, BACKGROUND, FOREGROUND};
use crate::Idx2d;

/// 前景使用的邻接规则. 背景使用它的对偶.
pub const FOREGROUND_ADJACENCY: Adjacency = Adjacency::Four;

/// 3×3 邻域中与中心 4-相邻的格子.
const EDGE_CELLS: [Idx2d; 4] = [(0, 1), (1, 0), (1, 2), (2, 1)];

/// 3×3 邻域中除中心外的所有格子.
const RING_CELLS: [Idx2d; 8] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
];

/// 行优先的 3×3 二值邻域, 下标 `4` 为中心.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Patch([u8; 9]);

impl Patch {
    /// 由 9 个像素构造, 非零视为前景.
    pub fn new(cells: [u8; 9]) -> Self {
        Self(cells.map(|p| if is_foreground(p) { FOREGROUND } else { BACKGROUND }))
    }

    /// 读取 `img` 中以 `center` 为中心的邻域. 中心必须离边界至少一格, 否则 panic.
    pub fn around(img: ArrayView2<u8>, center: Idx2d) -> Self {
        let mut patch = Self::default();
        patch.load(img, center);
        patch
    }

    /// 就地覆写为 `img` 中以 `(h, w)` 为中心的邻域.
    pub(crate) fn load(&mut self, img: ArrayView2<u8>, (h, w): Idx2d) {
        debug_assert!(h >= 1 && w >= 1 && h + 1 < img.nrows() && w + 1 < img.ncols());
        for dh in 0..3 {
            for dw in 0..3 {
                let p = img[(h + dh - 1, w + dw - 1)];
                self.0[dh * 3 + dw] = if is_foreground(p) { FOREGROUND } else { BACKGROUND };
            }
        }
    }

    /// 前景背景互换.
    #[inline]
    pub fn complement(&self) -> Self {
        Self(self.0.map(|p| FOREGROUND - p))
    }

    /// 中心像素.
    #[inline]
    pub fn center(&self) -> u8 {
        self.0[4]
    }

    /// 全部像素.
    #[inline]
    pub fn cells(&self) -> &[u8; 9] {
        &self.0
    }
}

/// simple point 判定器.
///
/// 内部持有一个 3×3 缓冲区和一个连通域标记器, 在 warping 的热循环中反复使用,
/// 不再分配内存. 不可跨线程共享, 每个切片任务各持有一个.
#[derive(Debug)]
pub struct SimplePointOracle {
    labeler: ComponentLabeler,
    scratch: Array2<u8>,
}

impl Default for SimplePointOracle {
    fn default() -> Self {
        Self {
            labeler: ComponentLabeler::new(),
            scratch: Array2::zeros((3, 3)),
        }
    }
}

impl SimplePointOracle {
    /// 新判定器.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 拓扑数: 去掉中心后, 以 `adj` 标记邻域前景, 统计相关格子上出现的不同编号数.
    ///
    /// 4-邻接只统计与中心 4-相邻的格子, 8-邻接统计全部 8 个格子.
    pub fn topological_number(&mut self, patch: &Patch, adj: Adjacency) -> usize {
        for (dst, src) in self.scratch.iter_mut().zip(patch.cells()) {
            *dst = *src;
        }
        self.scratch[(1, 1)] = BACKGROUND;
        self.labeler.run(self.scratch.view(), adj);

        let counted: &[Idx2d] = match adj {
            Adjacency::Four => &EDGE_CELLS,
            Adjacency::Eight => &RING_CELLS,
        };
        let labels = self.labeler.labels();
        // 3×3 内最多 8 个连通域.
        let mut seen = [false; 9];
        counted
            .iter()
            .map(|pos| labels[*pos] as usize)
            .filter(|id| *id != 0 && !std::mem::replace(&mut seen[*id], true))
            .count()
    }

    /// 前景使用 `adj`, 背景使用其对偶时, 中心是否为 simple point.
    pub fn is_simple(&mut self, patch: &Patch, adj: Adjacency) -> bool {
        self.topological_number(patch, adj) == 1
            && self.topological_number(&patch.complement(), adj.dual()) == 1
    }
}

/// 一次性判定. 热循环中请复用 [`SimplePointOracle`].
pub fn is_simple(patch: &Patch, adj: Adjacency) -> bool {
    SimplePointOracle::new().is_simple(patch, adj)
}
