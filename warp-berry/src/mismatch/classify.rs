use itertools::Itertools;
use ndarray::{Array2, ArrayView2};

use super::MismatchKind;
use crate::components::{self, Adjacency, ComponentLabeler};
use crate::config::ClassifyRadius;
use crate::consts::gray::BACKGROUND;
use crate::consts::ElemType;
use crate::topology::FOREGROUND_ADJACENCY;
use crate::warp::MismatchPoint;
use crate::Idx2d;

/// 错误点 8-邻域 (只含图像内的格子) 中不同连通域编号的形态. 背景编号为 `0`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NeighbourPattern {
    /// 只有背景 (或根本没有邻居).
    AllBackground,

    /// 只有一个物体, 没有背景.
    SingleObject,

    /// 恰好两种编号, 通常是一个物体加背景.
    ObjectAndBackground,

    /// 三种及以上编号.
    MultipleObjects,
}

impl NeighbourPattern {
    /// 由去重后的编号集合判定.
    pub fn from_ids(ids: &[u32]) -> Self {
        match ids {
            [] | [0] => Self::AllBackground,
            [_] => Self::SingleObject,
            [_, _] => Self::ObjectAndBackground,
            _ => Self::MultipleObjects,
        }
    }
}

/// 分类判定表.
///
/// `splits_when_removed` 只在 "两种编号 + 中心为前景" 时调用: 它回答
/// "把中心改为背景后, 邻域里是否出现了两个以上的编号".
pub fn decide(
    pattern: NeighbourPattern,
    center: ElemType,
    splits_when_removed: impl FnOnce() -> bool,
) -> MismatchKind {
    use ElemType::{Background, Foreground};
    use NeighbourPattern::*;

    match (pattern, center) {
        (AllBackground, Foreground) => MismatchKind::ObjectDeletion,
        (AllBackground, Background) => MismatchKind::ObjectAddition,
        (SingleObject, Foreground) => MismatchKind::HoleAddition,
        (SingleObject, Background) => MismatchKind::HoleDeletion,
        (ObjectAndBackground, Background) => MismatchKind::HoleAddition,
        (ObjectAndBackground, Foreground) => {
            if splits_when_removed() {
                MismatchKind::Split
            } else {
                MismatchKind::HoleDeletion
            }
        }
        (MultipleObjects, Background) => MismatchKind::Merge,
        (MultipleObjects, Foreground) => MismatchKind::Split,
    }
}

/// `pos` 的 8-邻居 (图像内) 的去重编号, 升序.
fn neighbour_ids(labels: ArrayView2<u32>, pos: Idx2d) -> Vec<u32> {
    Adjacency::Eight
        .neighbours(pos)
        .filter_map(|p| labels.get(p).copied())
        .sorted_unstable()
        .dedup()
        .collect()
}

/// 给 warping 后剩下的错误点分类.
#[derive(Debug, Default)]
pub struct MismatchClassifier {
    radius: ClassifyRadius,
    labeler: ComponentLabeler,
}

impl MismatchClassifier {
    /// 以给定试翻转范围构造.
    pub fn new(radius: ClassifyRadius) -> Self {
        Self {
            radius,
            labeler: ComponentLabeler::new(),
        }
    }

    /// 逐点分类, 输出与 `mismatches` 一一对应.
    ///
    /// 连通域以前景邻接规则在整张 `warped` 上标记一次.
    pub fn classify(
        &mut self,
        warped: ArrayView2<u8>,
        mismatches: &[MismatchPoint],
    ) -> Vec<MismatchKind> {
        let components = components::label(warped, FOREGROUND_ADJACENCY);
        mismatches
            .iter()
            .map(|mp| {
                let ids = neighbour_ids(components.labels(), mp.pos);
                decide(
                    NeighbourPattern::from_ids(&ids),
                    ElemType::of(warped[mp.pos]),
                    || self.splits_when_removed(warped, mp.pos),
                )
            })
            .collect()
    }

    /// 把 `pos` 改为背景, 在试翻转范围内重新标记, 看邻域编号是否多于两种.
    ///
    /// 半径为 `0` 的窗口里没有邻居, 按整张切片处理.
    fn splits_when_removed(&mut self, warped: ArrayView2<u8>, (h, w): Idx2d) -> bool {
        let (trial, center) = match self.radius {
            ClassifyRadius::WholeSlice | ClassifyRadius::Local(0) => {
                let mut trial = warped.to_owned();
                trial[(h, w)] = BACKGROUND;
                (trial, (h, w))
            }
            ClassifyRadius::Local(r) => {
                let n = 2 * r + 1;
                // 越界部分为背景.
                let mut trial = Array2::from_shape_fn((n, n), |(dh, dw)| {
                    match ((h + dh).checked_sub(r), (w + dw).checked_sub(r)) {
                        (Some(y), Some(x)) => warped.get((y, x)).copied().unwrap_or(BACKGROUND),
                        _ => BACKGROUND,
                    }
                });
                trial[(r, r)] = BACKGROUND;
                (trial, (r, r))
            }
        };
        self.labeler.run(trial.view(), FOREGROUND_ADJACENCY);
        neighbour_ids(self.labeler.labels(), center).len() > 2
    }
}
