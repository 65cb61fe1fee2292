//! 拓扑错误的类别, 分类与聚类.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, BitOr, Index, IndexMut};

mod classify;
mod cluster;

pub use classify::{decide, MismatchClassifier, NeighbourPattern};
pub use cluster::{cluster, cluster_by_error, cluster_by_type, mismatch_image};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 六类拓扑错误. 判别值即历史上使用的标志位.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum MismatchKind {
    /// 两个物体被连在一起.
    Merge = 0x01,

    /// 一个物体被断开.
    Split = 0x02,

    /// 物体内部多出空洞.
    HoleAddition = 0x04,

    /// 整个物体消失.
    ObjectDeletion = 0x08,

    /// 凭空多出物体.
    ObjectAddition = 0x10,

    /// 空洞被填上.
    HoleDeletion = 0x20,
}

impl MismatchKind {
    /// 全部类别, 按标志位升序.
    pub const ALL: [Self; 6] = [
        Self::Merge,
        Self::Split,
        Self::HoleAddition,
        Self::ObjectDeletion,
        Self::ObjectAddition,
        Self::HoleDeletion,
    ];

    /// 标志位.
    #[inline]
    pub const fn flag(self) -> u8 {
        self as u8
    }

    /// 在 [`Self::ALL`] 中的下标.
    #[inline]
    pub const fn index(self) -> usize {
        (self as u8).trailing_zeros() as usize
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Merge => "merge",
            Self::Split => "split",
            Self::HoleAddition => "hole addition",
            Self::ObjectDeletion => "object deletion",
            Self::ObjectAddition => "object addition",
            Self::HoleDeletion => "hole deletion",
        };
        f.write_str(name)
    }
}

/// 错误类别集合, 用于选择聚类误差统计哪些类别.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KindSet(u8);

impl KindSet {
    /// 空集.
    pub const EMPTY: Self = Self(0);

    /// 全部六类.
    pub const ALL: Self = Self(0x3f);

    /// 只统计分裂与合并.
    pub const SPLITS_AND_MERGERS: Self =
        Self(MismatchKind::Merge.flag() | MismatchKind::Split.flag());

    /// 由标志位构造, 未定义的位被忽略.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// 标志位.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// 是否包含 `kind`.
    #[inline]
    pub const fn contains(self, kind: MismatchKind) -> bool {
        self.0 & kind.flag() != 0
    }

    /// 是否为空.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 按标志位升序迭代包含的类别.
    pub fn iter(self) -> impl Iterator<Item = MismatchKind> {
        MismatchKind::ALL
            .into_iter()
            .filter(move |k| self.contains(*k))
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::ALL
    }
}

impl From<MismatchKind> for KindSet {
    #[inline]
    fn from(kind: MismatchKind) -> Self {
        Self(kind.flag())
    }
}

impl BitOr for KindSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<MismatchKind> for KindSet {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: MismatchKind) -> Self::Output {
        Self(self.0 | rhs.flag())
    }
}

impl BitOr for MismatchKind {
    type Output = KindSet;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        KindSet(self.flag() | rhs.flag())
    }
}

impl FromIterator<MismatchKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = MismatchKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |acc, k| acc | k)
    }
}

/// 各类错误的个数 (按类型计数, 或按连通簇计数).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusteredMismatchCounts([usize; 6]);

impl ClusteredMismatchCounts {
    /// 某一类的个数.
    #[inline]
    pub fn get(&self, kind: MismatchKind) -> usize {
        self.0[kind.index()]
    }

    /// `kinds` 中各类个数之和.
    pub fn total(&self, kinds: KindSet) -> usize {
        kinds.iter().map(|k| self.get(k)).sum()
    }

    /// 分裂个数.
    #[inline]
    pub fn splits(&self) -> usize {
        self.get(MismatchKind::Split)
    }

    /// 合并个数.
    #[inline]
    pub fn mergers(&self) -> usize {
        self.get(MismatchKind::Merge)
    }

    /// 按 [`MismatchKind::ALL`] 顺序的原始计数.
    #[inline]
    pub fn as_array(&self) -> &[usize; 6] {
        &self.0
    }
}

impl Index<MismatchKind> for ClusteredMismatchCounts {
    type Output = usize;

    #[inline]
    fn index(&self, kind: MismatchKind) -> &Self::Output {
        &self.0[kind.index()]
    }
}

impl IndexMut<MismatchKind> for ClusteredMismatchCounts {
    #[inline]
    fn index_mut(&mut self, kind: MismatchKind) -> &mut Self::Output {
        &mut self.0[kind.index()]
    }
}

impl AddAssign for ClusteredMismatchCounts {
    fn add_assign(&mut self, rhs: Self) {
        for (l, r) in self.0.iter_mut().zip(rhs.0) {
            *l += r;
        }
    }
}

impl Add for ClusteredMismatchCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sum for ClusteredMismatchCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, c| acc + c)
    }
}
