use log::info;

use super::{run_slices, slice_tasks, BestThreshold, ClassificationStatistics, ThresholdRange};
use crate::config::MetricConfig;
use crate::data::{Binarization, LabelSlice, LabelStack, StackRole};
use crate::error::check_threshold;
use crate::{Idx2d, WarpResult};

/// 逐像素误差与 precision/recall 统计.
///
/// `original` 大于 0 为前景; `proposal` 严格大于阈值为前景.
#[derive(Debug, Clone)]
pub struct PixelErrorMetric<'a> {
    original: &'a LabelStack,
    proposal: &'a LabelStack,
    mask: Option<&'a LabelStack>,
    config: MetricConfig,
}

impl<'a> PixelErrorMetric<'a> {
    /// 两个栈必须同形状.
    pub fn new(
        original: &'a LabelStack,
        proposal: &'a LabelStack,
        config: MetricConfig,
    ) -> WarpResult<Self> {
        original.check_same_shape(proposal, StackRole::Proposal)?;
        Ok(Self {
            original,
            proposal,
            mask: None,
            config,
        })
    }

    /// 只统计掩膜内 (大于 0) 的像素.
    pub fn with_mask(mut self, mask: &'a LabelStack) -> WarpResult<Self> {
        self.original.check_same_shape(mask, StackRole::Mask)?;
        self.mask = Some(mask);
        Ok(self)
    }

    /// 逐切片均方误差的平均值.
    ///
    /// `Some(t)` 时两者都按 `> t` 二值化; `None` 时直接使用原始值.
    /// 有掩膜时每张切片除以掩膜内像素数. 没有切片时返回 `None`.
    pub fn pixel_error(&self, threshold: Option<f64>) -> WarpResult<Option<f64>> {
        if let Some(t) = threshold {
            check_threshold(t)?;
        }
        let tasks = slice_tasks(self.original, self.proposal, self.mask);
        let n = tasks.len();
        let per_slice = run_slices(&self.config, tasks, move |task| {
            Ok(slice_squared_error(
                task.source.as_slice(),
                task.target.as_slice(),
                task.mask.as_ref().map(|m| m.as_slice()),
                threshold,
            ))
        })?;
        Ok(mean_of(per_slice, n))
    }

    /// 在阈值 `threshold` 下累加所有切片的 TP/TN/FP/FN, `metric_value` 为切片平均.
    pub fn precision_recall_stats(&self, threshold: f64) -> WarpResult<ClassificationStatistics> {
        check_threshold(threshold)?;
        let tasks = slice_tasks(self.original, self.proposal, self.mask);
        let n = tasks.len();
        let per_slice = run_slices(&self.config, tasks, move |task| {
            Ok(slice_statistics(
                task.source.as_slice(),
                task.target.as_slice(),
                task.mask.as_ref().map(|m| m.as_slice()),
                threshold,
            ))
        })?;
        Ok(sum_statistics(per_slice, n))
    }

    /// 逐阈值统计.
    pub fn precision_recall_sweep(
        &self,
        range: ThresholdRange,
    ) -> WarpResult<Vec<(f64, ClassificationStatistics)>> {
        range
            .iter()
            .map(|t| {
                let stats = self.precision_recall_stats(t)?;
                info!("pixel statistics at threshold {t}: F-score = {}", stats.f_score());
                Ok((t, stats))
            })
            .collect()
    }

    /// 扫描区间内的最大 F-score.
    pub fn max_f_score(&self, range: ThresholdRange) -> WarpResult<BestThreshold> {
        Ok(best_f_score(range, &self.precision_recall_sweep(range)?))
    }
}

/// 线性扫描, 记录最大 F-score. `NaN` 永远不会成为最大值; 全部无效时为 `0`.
pub(crate) fn best_f_score(
    range: ThresholdRange,
    sweep: &[(f64, ClassificationStatistics)],
) -> BestThreshold {
    let mut best = BestThreshold {
        threshold: range.min(),
        value: 0.0,
    };
    for (t, stats) in sweep {
        let f = stats.f_score();
        if f > best.value {
            best = BestThreshold {
                threshold: *t,
                value: f,
            };
        }
    }
    info!("best F-score {} at threshold {}", best.value, best.threshold);
    best
}

/// 参与统计的像素.
fn counted<'s>(
    shape_of: LabelSlice<'s>,
    mask: Option<LabelSlice<'s>>,
) -> impl Iterator<Item = Idx2d> + 's {
    shape_of
        .pos_iter()
        .filter(move |&pos| mask.map_or(true, |m| Binarization::Positive.is_foreground(m[pos])))
}

/// 单张切片的均方误差.
pub(crate) fn slice_squared_error<'a>(
    original: LabelSlice<'a>,
    proposal: LabelSlice,
    mask: Option<LabelSlice<'a>>,
    threshold: Option<f64>,
) -> f64 {
    let mut n = 0usize;
    let mut sum = 0.0f64;
    for pos in counted(original, mask) {
        let diff = match threshold {
            Some(t) => {
                let rule = Binarization::Above(t);
                f64::from(rule.apply(original[pos])) - f64::from(rule.apply(proposal[pos]))
            }
            None => f64::from(original[pos]) - f64::from(proposal[pos]),
        };
        sum += diff * diff;
        n += 1;
    }
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// 单张切片的 TP/TN/FP/FN. `metric_value` 为 `(fp + fn) / 像素数`.
pub(crate) fn slice_statistics<'a>(
    original: LabelSlice<'a>,
    proposal: LabelSlice,
    mask: Option<LabelSlice<'a>>,
    threshold: f64,
) -> ClassificationStatistics {
    let rule = Binarization::Above(threshold);
    let mut stats = ClassificationStatistics::default();
    for pos in counted(original, mask) {
        let truth = Binarization::Positive.is_foreground(original[pos]);
        let guess = rule.is_foreground(proposal[pos]);
        match (guess, truth) {
            (true, true) => stats.true_positives += 1,
            (true, false) => stats.false_positives += 1,
            (false, true) => stats.false_negatives += 1,
            (false, false) => stats.true_negatives += 1,
        }
    }
    let n = stats.total();
    if n > 0 {
        stats.metric_value = (stats.false_positives + stats.false_negatives) as f64 / n as f64;
    }
    stats
}

/// 失败切片贡献 `0`, 但仍计入切片数. `n == 0` 时为 `None`.
pub(crate) fn mean_of(values: Vec<Option<f64>>, n: usize) -> Option<f64> {
    (n > 0).then(|| values.into_iter().flatten().sum::<f64>() / n as f64)
}

/// 计数直接相加, `metric_value` 取切片平均.
pub(crate) fn sum_statistics(
    values: Vec<Option<ClassificationStatistics>>,
    n: usize,
) -> ClassificationStatistics {
    let total = values
        .into_iter()
        .flatten()
        .fold(ClassificationStatistics::default(), |acc, s| acc + s);
    if n == 0 {
        total
    } else {
        total.averaged(n)
    }
}
