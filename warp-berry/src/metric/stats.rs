use std::ops::{Add, AddAssign};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 逐像素二分类统计.
///
/// 计数为整数; `metric_value` 为 (可能经过平均的) 像素误差.
/// 分母为零时 precision/recall/F-score 为 `NaN`, 不做特殊处理.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClassificationStatistics {
    /// 真阳性.
    pub true_positives: usize,

    /// 真阴性.
    pub true_negatives: usize,

    /// 假阳性.
    pub false_positives: usize,

    /// 假阴性.
    pub false_negatives: usize,

    /// 对应的误差值.
    pub metric_value: f64,
}

impl ClassificationStatistics {
    /// `tp / (tp + fp)`.
    #[inline]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// `tp / (tp + fn)`.
    #[inline]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// `2PR / (P + R)`.
    pub fn f_score(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        2.0 * p * r / (p + r)
    }

    /// 参与统计的像素个数.
    #[inline]
    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// `metric_value` 除以 `n`, 计数不变.
    pub(crate) fn averaged(mut self, n: usize) -> Self {
        self.metric_value /= n as f64;
        self
    }
}

#[inline]
fn ratio(num: usize, den: usize) -> f64 {
    num as f64 / den as f64
}

impl AddAssign for ClassificationStatistics {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positives += rhs.true_positives;
        self.true_negatives += rhs.true_negatives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
        self.metric_value += rhs.metric_value;
    }
}

impl Add for ClassificationStatistics {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}
