//! 单切片 simple point warping.
//!
//! 把 reference 切片 (source) 逐步向 proposal 切片 (target) 的二值化结果靠拢,
//! 每次只翻转 simple point, 因此 warped 结果与 source 拓扑等价.

use std::cmp::Reverse;

use log::debug;
use ndarray::{s, Array2};
use ordered_float::OrderedFloat;

use crate::consts::gray::is_foreground;
use crate::consts::SIMPLE_POINT_THRESHOLD;
use crate::data::{Binarization, LabelSlice, PosIter, StackRole};
use crate::error::check_threshold;
use crate::topology::{Patch, SimplePointOracle, FOREGROUND_ADJACENCY};
use crate::{Idx2d, WarpError, WarpResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// warped source 与二值化 target 不一致的像素.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MismatchPoint {
    /// 切片内位置 `(h, w)`.
    pub pos: Idx2d,

    /// `|target - threshold|`, 即 proposal 在该点的 "确信程度".
    pub weight: f64,
}

/// 单切片 warping 结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WarpingResult {
    /// warped source, `0/1`, 与输入切片同形状.
    pub warped: Array2<u8>,

    /// 剩余错误点数 / 切片像素数. 空切片为 `0`.
    pub error: f64,

    /// 剩余错误点, 按权重降序, 同权重按 `(h, w)` 升序.
    pub mismatches: Vec<MismatchPoint>,

    /// 每一轮开始时的错误点个数, 单调不增.
    pub pass_counts: Vec<usize>,
}

impl WarpingResult {
    /// 松弛轮数 (含最后一轮检查).
    #[inline]
    pub fn passes(&self) -> usize {
        self.pass_counts.len()
    }

    /// 是否完全消除了差异.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// 单切片 warper. 每个切片任务各持有一个, 其中的判定器缓冲区在轮次间复用.
#[derive(Debug)]
pub struct SlicePointWarper {
    simple_point_threshold: f64,
    oracle: SimplePointOracle,
    patch: Patch,
}

impl Default for SlicePointWarper {
    fn default() -> Self {
        Self::new(SIMPLE_POINT_THRESHOLD)
    }
}

impl SlicePointWarper {
    /// 权重必须严格大于 `simple_point_threshold` 才会被翻转.
    pub fn new(simple_point_threshold: f64) -> Self {
        Self {
            simple_point_threshold,
            oracle: SimplePointOracle::new(),
            patch: Patch::default(),
        }
    }

    /// 把 `source` 向 `target` 在 `threshold` 下的二值化结果 warp.
    ///
    /// `source` 与 `mask` 大于 0 为前景, `target` 严格大于 `threshold` 为前景.
    /// 有 `mask` 时只有掩膜内的像素会被统计和翻转.
    ///
    /// 每一轮按权重降序遍历当前错误点, 就地翻转其中的 simple point;
    /// 错误点数为 `0` 或不再减少时停止. 每次翻转都使错误点数减一,
    /// 因此总能在有限轮内结束.
    pub fn warp(
        &mut self,
        source: LabelSlice,
        target: LabelSlice,
        mask: Option<LabelSlice>,
        threshold: f64,
    ) -> WarpResult<WarpingResult> {
        check_threshold(threshold)?;
        let (h, w) = source.shape();
        check_slice_shape(source.shape(), target.shape(), StackRole::Proposal)?;
        if let Some(m) = mask {
            check_slice_shape(source.shape(), m.shape(), StackRole::Mask)?;
        }

        // 外扩一圈背景, 邻域读取不必判断越界.
        let mut src = Array2::<u8>::zeros((h + 2, w + 2));
        src.slice_mut(s![1..h + 1, 1..w + 1])
            .assign(&source.binarize(Binarization::Positive));
        let tgt = target.binarize(Binarization::Above(threshold));
        let mask = mask.map(|m| m.binarize(Binarization::Positive));

        let mut pass_counts = Vec::new();
        let mismatches = loop {
            let mismatches = collect_mismatches(&src, &tgt, mask.as_ref(), target, threshold);
            let count = mismatches.len();
            debug!("warping pass {}: {} mismatches", pass_counts.len(), count);

            let stalled = pass_counts.last() == Some(&count);
            pass_counts.push(count);
            if count == 0 || stalled {
                break mismatches;
            }

            for mp in mismatches.iter() {
                // 已按权重降序.
                if mp.weight <= self.simple_point_threshold {
                    break;
                }
                let (ph, pw) = (mp.pos.0 + 1, mp.pos.1 + 1);
                self.patch.load(src.view(), (ph, pw));
                if self.oracle.is_simple(&self.patch, FOREGROUND_ADJACENCY) {
                    src[(ph, pw)] ^= 1;
                }
            }
        };

        let error = if h * w == 0 {
            0.0
        } else {
            mismatches.len() as f64 / (h * w) as f64
        };
        Ok(WarpingResult {
            warped: src.slice(s![1..h + 1, 1..w + 1]).to_owned(),
            error,
            mismatches,
            pass_counts,
        })
    }
}

/// 使用默认 simple point 阈值 warp 一张切片.
pub fn warp_slice(
    source: LabelSlice,
    target: LabelSlice,
    mask: Option<LabelSlice>,
    threshold: f64,
) -> WarpResult<WarpingResult> {
    SlicePointWarper::default().warp(source, target, mask, threshold)
}

fn check_slice_shape(expected: Idx2d, found: Idx2d, role: StackRole) -> WarpResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(WarpError::ShapeMismatch {
            role,
            expected: (1, expected.0, expected.1),
            found: (1, found.0, found.1),
        })
    }
}

/// 当前所有错误点, 按权重降序, 同权重按行优先顺序.
///
/// `src` 带一圈外扩, 其余参数不带.
fn collect_mismatches(
    src: &Array2<u8>,
    tgt: &Array2<u8>,
    mask: Option<&Array2<u8>>,
    target: LabelSlice,
    threshold: f64,
) -> Vec<MismatchPoint> {
    let mut points: Vec<MismatchPoint> = PosIter::new(tgt.dim())
        .filter(|&pos| mask.map_or(true, |m| is_foreground(m[pos])))
        .filter(|&(h, w)| src[(h + 1, w + 1)] != tgt[(h, w)])
        .map(|pos| MismatchPoint {
            pos,
            weight: (f64::from(target[pos]) - threshold).abs(),
        })
        .collect();
    points.sort_by_key(|mp| (Reverse(OrderedFloat(mp.weight)), mp.pos));
    points
}
