use ndarray::{Array2, ArrayView2};

use super::{ClusteredMismatchCounts, KindSet, MismatchKind};
use crate::components::{count_components, Adjacency};
use crate::consts::gray::FOREGROUND;
use crate::consts::ElemType;
use crate::warp::MismatchPoint;
use crate::Idx2d;

/// 按连通簇计数时使用的细分情形.
///
/// 空洞增删按 warped 中心是前景还是背景再拆成两种, 分别聚类后再合并计数.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum FineCase {
    ObjectAddition,
    HoleDeletionOnBackground,
    Merge,
    HoleAdditionOnBackground,
    ObjectDeletion,
    HoleAdditionOnForeground,
    Split,
    HoleDeletionOnForeground,
}

impl FineCase {
    const ALL: [Self; 8] = [
        Self::ObjectAddition,
        Self::HoleDeletionOnBackground,
        Self::Merge,
        Self::HoleAdditionOnBackground,
        Self::ObjectDeletion,
        Self::HoleAdditionOnForeground,
        Self::Split,
        Self::HoleDeletionOnForeground,
    ];

    fn of(kind: MismatchKind, center: ElemType) -> Self {
        match (kind, center.is_foreground()) {
            (MismatchKind::ObjectAddition, _) => Self::ObjectAddition,
            (MismatchKind::ObjectDeletion, _) => Self::ObjectDeletion,
            (MismatchKind::Merge, _) => Self::Merge,
            (MismatchKind::Split, _) => Self::Split,
            (MismatchKind::HoleDeletion, false) => Self::HoleDeletionOnBackground,
            (MismatchKind::HoleDeletion, true) => Self::HoleDeletionOnForeground,
            (MismatchKind::HoleAddition, false) => Self::HoleAdditionOnBackground,
            (MismatchKind::HoleAddition, true) => Self::HoleAdditionOnForeground,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// 合并与分裂沿对角也算相连, 其余只看 4-邻接.
    fn adjacency(self) -> Adjacency {
        match self {
            Self::Merge | Self::Split => Adjacency::Eight,
            _ => Adjacency::Four,
        }
    }

    fn kind(self) -> MismatchKind {
        match self {
            Self::ObjectAddition => MismatchKind::ObjectAddition,
            Self::ObjectDeletion => MismatchKind::ObjectDeletion,
            Self::Merge => MismatchKind::Merge,
            Self::Split => MismatchKind::Split,
            Self::HoleDeletionOnBackground | Self::HoleDeletionOnForeground => {
                MismatchKind::HoleDeletion
            }
            Self::HoleAdditionOnBackground | Self::HoleAdditionOnForeground => {
                MismatchKind::HoleAddition
            }
        }
    }
}

/// 每类错误点的个数.
pub fn cluster_by_type(kinds: &[MismatchKind]) -> ClusteredMismatchCounts {
    let mut counts = ClusteredMismatchCounts::default();
    for k in kinds {
        counts[*k] += 1;
    }
    counts
}

/// 每类错误点形成的连通簇个数. 同一簇的错误点只算一次.
///
/// `kinds` 与 `mismatches` 一一对应, 位置均在 `warped` 内.
pub fn cluster_by_error(
    warped: ArrayView2<u8>,
    mismatches: &[MismatchPoint],
    kinds: &[MismatchKind],
) -> ClusteredMismatchCounts {
    debug_assert_eq!(mismatches.len(), kinds.len());
    let mut markers: [Option<Array2<u8>>; 8] = Default::default();
    for (mp, kind) in mismatches.iter().zip(kinds) {
        let case = FineCase::of(*kind, ElemType::of(warped[mp.pos]));
        markers[case.index()].get_or_insert_with(|| Array2::zeros(warped.dim()))[mp.pos] =
            FOREGROUND;
    }

    let mut counts = ClusteredMismatchCounts::default();
    for case in FineCase::ALL {
        if let Some(img) = &markers[case.index()] {
            counts[case.kind()] += count_components(img.view(), case.adjacency());
        }
    }
    counts
}

/// 按 `by_error` 选择聚类方式.
pub fn cluster(
    warped: ArrayView2<u8>,
    mismatches: &[MismatchPoint],
    kinds: &[MismatchKind],
    by_error: bool,
) -> ClusteredMismatchCounts {
    if by_error {
        cluster_by_error(warped, mismatches, kinds)
    } else {
        cluster_by_type(kinds)
    }
}

/// 错误点分类图: 每个错误点处为其类别标志位与 `selected` 的交, 其余为 `0`.
pub fn mismatch_image(
    shape: Idx2d,
    mismatches: &[MismatchPoint],
    kinds: &[MismatchKind],
    selected: KindSet,
) -> Array2<u8> {
    let mut img = Array2::zeros(shape);
    for (mp, kind) in mismatches.iter().zip(kinds) {
        img[mp.pos] = kind.flag() & selected.bits();
    }
    img
}
