use log::info;
use ndarray::Array2;

use super::pixel::{best_f_score, mean_of, slice_statistics, sum_statistics};
use super::{
    run_slices, slice_tasks, BestThreshold, ClassificationStatistics, SliceTask, ThresholdRange,
};
use crate::config::{ClassifyRadius, MetricConfig};
use crate::data::{Binarization, LabelStack, OwnedLabelSlice, StackRole};
use crate::error::check_threshold;
use crate::mismatch::{
    cluster, mismatch_image, ClusteredMismatchCounts, KindSet, MismatchClassifier, MismatchKind,
};
use crate::warp::{SlicePointWarper, WarpingResult};
use crate::WarpResult;

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 单张切片的 warping, 分类与聚类结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceReport {
    /// warping 结果.
    pub warping: WarpingResult,

    /// 与 `warping.mismatches` 一一对应的类别.
    pub kinds: Vec<MismatchKind>,

    /// 各类计数 (按类型或按簇, 取决于调用参数).
    pub counts: ClusteredMismatchCounts,
}

impl SliceReport {
    /// 错误点分类图, 只保留 `selected` 中的类别.
    pub fn mismatch_image(&self, selected: KindSet) -> Array2<u8> {
        mismatch_image(
            self.warping.warped.dim(),
            &self.warping.mismatches,
            &self.kinds,
            selected,
        )
    }
}

/// 整个栈在某一阈值下的结果.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WarpingReport {
    /// 二值化阈值.
    pub threshold: f64,

    /// 每张切片的结果. 失败的切片 (`FailurePolicy::Degrade`) 为 `None`.
    pub slices: Vec<Option<SliceReport>>,

    /// 单张切片的像素数.
    pub slice_size: usize,
}

impl WarpingReport {
    /// 切片数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.slices.len()
    }

    /// 失败切片的序号.
    pub fn failed(&self) -> Vec<usize> {
        self.slices
            .iter()
            .enumerate()
            .filter_map(|(z, s)| s.is_none().then_some(z))
            .collect()
    }

    /// 所有切片的计数之和.
    pub fn counts(&self) -> ClusteredMismatchCounts {
        self.slices.iter().flatten().map(|s| s.counts).sum()
    }

    /// 逐切片 warping error 的平均值.
    pub fn warping_error(&self) -> Option<f64> {
        let errors = self
            .slices
            .iter()
            .map(|s| s.as_ref().map(|s| s.warping.error))
            .collect();
        mean_of(errors, self.len_z())
    }

    /// `kinds` 中各类计数之和 / 总像素数.
    pub fn clustered_error(&self, kinds: KindSet) -> Option<f64> {
        if self.slices.is_empty() {
            return None;
        }
        let n = self.len_z() * self.slice_size;
        if n == 0 {
            return Some(0.0);
        }
        Some(self.counts().total(kinds) as f64 / n as f64)
    }
}

/// 某一阈值下的分裂与合并个数.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SplitsAndMergers {
    /// 阈值.
    pub threshold: f64,

    /// 分裂个数.
    pub splits: usize,

    /// 合并个数.
    pub mergers: usize,
}

/// 单切片完整分析, 在工作线程中执行.
fn analyse_slice(
    task: &SliceTask,
    threshold: f64,
    simple_point_threshold: f64,
    radius: ClassifyRadius,
    by_error: bool,
) -> WarpResult<SliceReport> {
    let warping = SlicePointWarper::new(simple_point_threshold).warp(
        task.source.as_slice(),
        task.target.as_slice(),
        task.mask.as_ref().map(|m| m.as_slice()),
        threshold,
    )?;
    let kinds =
        MismatchClassifier::new(radius).classify(warping.warped.view(), &warping.mismatches);
    let counts = cluster(warping.warped.view(), &warping.mismatches, &kinds, by_error);
    Ok(SliceReport {
        warping,
        kinds,
        counts,
    })
}

/// warp `task.source` 后, 与 `task.target` 做逐像素统计.
fn warped_statistics(
    task: &SliceTask,
    threshold: f64,
    simple_point_threshold: f64,
) -> WarpResult<ClassificationStatistics> {
    let mask = task.mask.as_ref().map(|m| m.as_slice());
    let warping = SlicePointWarper::new(simple_point_threshold).warp(
        task.source.as_slice(),
        task.target.as_slice(),
        mask,
        threshold,
    )?;
    let warped = OwnedLabelSlice::new(warping.warped.mapv(f32::from));
    Ok(slice_statistics(
        warped.as_slice(),
        task.target.as_slice(),
        mask,
        threshold,
    ))
}

/// 拓扑保持的 warping error 评估入口.
///
/// reference 大于 0 为前景, proposal 严格大于阈值为前景. 所有切片形状相同.
#[derive(Debug, Clone)]
pub struct WarpingMetric<'a> {
    reference: &'a LabelStack,
    proposal: &'a LabelStack,
    mask: Option<&'a LabelStack>,
    config: MetricConfig,
}

impl<'a> WarpingMetric<'a> {
    /// 两个栈必须同形状.
    pub fn new(
        reference: &'a LabelStack,
        proposal: &'a LabelStack,
        config: MetricConfig,
    ) -> WarpResult<Self> {
        reference.check_same_shape(proposal, StackRole::Proposal)?;
        Ok(Self {
            reference,
            proposal,
            mask: None,
            config,
        })
    }

    /// 只统计与翻转掩膜内 (大于 0) 的像素.
    pub fn with_mask(mut self, mask: &'a LabelStack) -> WarpResult<Self> {
        self.reference.check_same_shape(mask, StackRole::Mask)?;
        self.mask = Some(mask);
        Ok(self)
    }

    /// 当前参数.
    #[inline]
    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    fn tasks(&self) -> Vec<SliceTask> {
        slice_tasks(self.reference, self.proposal, self.mask)
    }

    /// 逐切片 warping 结果, 按切片序号排列.
    pub fn warp(&self, threshold: f64) -> WarpResult<Vec<Option<WarpingResult>>> {
        check_threshold(threshold)?;
        let spt = self.config.simple_point_threshold;
        run_slices(&self.config, self.tasks(), move |task| {
            SlicePointWarper::new(spt).warp(
                task.source.as_slice(),
                task.target.as_slice(),
                task.mask.as_ref().map(|m| m.as_slice()),
                threshold,
            )
        })
    }

    /// 经典 warping error: 逐切片 (剩余错误点数 / 像素数) 的平均值.
    pub fn warping_error(&self, threshold: f64) -> WarpResult<Option<f64>> {
        let per_slice = self.warp(threshold)?;
        let n = per_slice.len();
        let errors = per_slice.into_iter().map(|r| r.map(|r| r.error)).collect();
        Ok(mean_of(errors, n))
    }

    /// 与 [`Self::warping_error`] 相同, 但在当前线程中逐张计算.
    pub fn warping_error_single_thread(&self, threshold: f64) -> WarpResult<Option<f64>> {
        check_threshold(threshold)?;
        let mut warper = SlicePointWarper::new(self.config.simple_point_threshold);
        let mut errors = Vec::with_capacity(self.reference.len_z());
        for z in 0..self.reference.len_z() {
            let r = warper.warp(
                self.reference.slice_at(z),
                self.proposal.slice_at(z),
                self.mask.map(|m| m.slice_at(z)),
                threshold,
            )?;
            errors.push(Some(r.error));
        }
        Ok(mean_of(errors, self.reference.len_z()))
    }

    /// warping, 分类与聚类的完整结果.
    ///
    /// `by_error` 为 `true` 时同类相连的错误点只算一个, 否则逐点计数.
    pub fn report(&self, threshold: f64, by_error: bool) -> WarpResult<WarpingReport> {
        check_threshold(threshold)?;
        let spt = self.config.simple_point_threshold;
        let radius = self.config.classify_radius;
        let slices = run_slices(&self.config, self.tasks(), move |task| {
            analyse_slice(&task, threshold, spt, radius, by_error)
        })?;
        let (h, w) = self.reference.slice_shape();
        Ok(WarpingReport {
            threshold,
            slices,
            slice_size: h * w,
        })
    }

    /// 聚类 warping error: `kinds` 中各类计数之和 / 总像素数.
    pub fn clustered_error(
        &self,
        threshold: f64,
        by_error: bool,
        kinds: KindSet,
    ) -> WarpResult<Option<f64>> {
        Ok(self.report(threshold, by_error)?.clustered_error(kinds))
    }

    /// 逐阈值统计分裂与合并个数.
    pub fn splits_and_mergers(
        &self,
        range: ThresholdRange,
        by_error: bool,
    ) -> WarpResult<Vec<SplitsAndMergers>> {
        range
            .iter()
            .map(|t| {
                let counts = self.report(t, by_error)?.counts();
                info!(
                    "threshold {t}: {} splits, {} mergers",
                    counts.splits(),
                    counts.mergers()
                );
                Ok(SplitsAndMergers {
                    threshold: t,
                    splits: counts.splits(),
                    mergers: counts.mergers(),
                })
            })
            .collect()
    }

    /// 只统计分裂与合并时, 扫描区间内最小的聚类误差. 没有切片时返回 `None`.
    ///
    /// 多个阈值并列最小时取最小的阈值.
    pub fn min_splits_and_mergers_error(
        &self,
        range: ThresholdRange,
        by_error: bool,
    ) -> WarpResult<Option<BestThreshold>> {
        let mut best: Option<BestThreshold> = None;
        for t in range.iter() {
            let Some(value) = self
                .report(t, by_error)?
                .clustered_error(KindSet::SPLITS_AND_MERGERS)
            else {
                return Ok(None);
            };
            info!("threshold {t}: split and merger error {value}");
            if best.map_or(true, |b| value < b.value) {
                best = Some(BestThreshold {
                    threshold: t,
                    value,
                });
            }
        }
        if let Some(b) = best {
            info!(
                "minimum split and merger error {} at threshold {}",
                b.value, b.threshold
            );
        }
        Ok(best)
    }

    /// warp 后的 reference 与 proposal 之间的逐像素统计.
    pub fn precision_recall_stats(&self, threshold: f64) -> WarpResult<ClassificationStatistics> {
        check_threshold(threshold)?;
        let spt = self.config.simple_point_threshold;
        let tasks = self.tasks();
        let n = tasks.len();
        let per_slice = run_slices(&self.config, tasks, move |task| {
            warped_statistics(&task, threshold, spt)
        })?;
        Ok(sum_statistics(per_slice, n))
    }

    /// 逐阈值的 [`Self::precision_recall_stats`].
    pub fn precision_recall_sweep(
        &self,
        range: ThresholdRange,
    ) -> WarpResult<Vec<(f64, ClassificationStatistics)>> {
        range
            .iter()
            .map(|t| {
                let stats = self.precision_recall_stats(t)?;
                info!("warped statistics at threshold {t}: F-score = {}", stats.f_score());
                Ok((t, stats))
            })
            .collect()
    }

    /// warp 后逐像素统计的最大 F-score.
    pub fn max_f_score(&self, range: ThresholdRange) -> WarpResult<BestThreshold> {
        Ok(best_f_score(range, &self.precision_recall_sweep(range)?))
    }

    /// 双向统计: reference 向 proposal warp, 二值化的 proposal 向 reference warp,
    /// 两个方向的计数相加, `metric_value` 取两者平均.
    pub fn dual_precision_recall_stats(
        &self,
        threshold: f64,
    ) -> WarpResult<ClassificationStatistics> {
        check_threshold(threshold)?;
        let spt = self.config.simple_point_threshold;
        let tasks = self.tasks();
        let n = tasks.len();
        let per_slice = run_slices(&self.config, tasks, move |task| {
            let forward = warped_statistics(&task, threshold, spt)?;
            let reversed = SliceTask {
                source: OwnedLabelSlice::new(
                    task.target
                        .as_slice()
                        .binarize(Binarization::Above(threshold))
                        .mapv(f32::from),
                ),
                target: task.source,
                mask: task.mask,
            };
            let backward = warped_statistics(&reversed, threshold, spt)?;
            Ok((forward, backward))
        })?;

        let (forward, backward): (Vec<_>, Vec<_>) = per_slice
            .into_iter()
            .map(|p| (p.map(|p| p.0), p.map(|p| p.1)))
            .unzip();
        Ok((sum_statistics(forward, n) + sum_statistics(backward, n)).averaged(2))
    }

    /// 逐阈值的 [`Self::dual_precision_recall_stats`].
    pub fn dual_precision_recall_sweep(
        &self,
        range: ThresholdRange,
    ) -> WarpResult<Vec<(f64, ClassificationStatistics)>> {
        range
            .iter()
            .map(|t| {
                let stats = self.dual_precision_recall_stats(t)?;
                info!("dual statistics at threshold {t}: F-score = {}", stats.f_score());
                Ok((t, stats))
            })
            .collect()
    }

    /// 双向统计的最大 F-score.
    pub fn dual_max_f_score(&self, range: ThresholdRange) -> WarpResult<BestThreshold> {
        Ok(best_f_score(range, &self.dual_precision_recall_sweep(range)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_THRESHOLD;
    use crate::warp::warp_slice;
    use crate::WarpError;
    use ndarray::{Array2, Array3};

    fn cfg() -> MetricConfig {
        MetricConfig::default().with_workers(3)
    }

    fn stack(s: Array2<f32>) -> LabelStack {
        LabelStack::from_slice(s)
    }

    fn square(n: usize, lo: usize, hi: usize) -> Array2<f32> {
        Array2::from_shape_fn((n, n), |(h, w)| {
            if (lo..=hi).contains(&h) && (lo..=hi).contains(&w) {
                1.0
            } else {
                0.0
            }
        })
    }

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_identical_background() {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Debug)
            .init();
        let a = stack(Array2::zeros((10, 10)));
        let m = WarpingMetric::new(&a, &a, cfg()).unwrap();
        assert_eq!(m.warping_error(DEFAULT_THRESHOLD).unwrap(), Some(0.0));
        let report = m.report(0.5, true).unwrap();
        assert_eq!(report.counts(), ClusteredMismatchCounts::default());
        assert_eq!(report.clustered_error(KindSet::ALL), Some(0.0));
        assert!(report.slices[0].as_ref().unwrap().warping.is_exact());
    }

    #[test]
    fn test_uniform_disagreement() {
        let r = stack(Array2::zeros((5, 5)));
        let p = stack(Array2::ones((5, 5)));
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        assert_eq!(m.warping_error(0.5).unwrap(), Some(1.0));

        // 一整块凭空新增: 按簇计一个, 按点计 25 个.
        let all = KindSet::ALL;
        assert_eq!(m.clustered_error(0.5, true, all).unwrap(), Some(1.0 / 25.0));
        assert_eq!(m.clustered_error(0.5, false, all).unwrap(), Some(1.0));

        let report = m.report(0.5, true).unwrap();
        let slice = report.slices[0].as_ref().unwrap();
        assert!(slice
            .kinds
            .iter()
            .all(|k| *k == MismatchKind::ObjectAddition));

        let only = KindSet::SPLITS_AND_MERGERS;
        assert_eq!(m.clustered_error(0.5, true, only).unwrap(), Some(0.0));
    }

    #[test]
    fn test_isolated_pixel_with_mask() {
        let mut dot = Array2::<f32>::zeros((5, 5));
        dot[(2, 2)] = 1.0;
        let r = stack(dot.clone());
        let p = stack(Array2::zeros((5, 5)));
        let mask = stack(dot);

        for m in [
            WarpingMetric::new(&r, &p, cfg()).unwrap(),
            WarpingMetric::new(&r, &p, cfg())
                .unwrap()
                .with_mask(&mask)
                .unwrap(),
        ] {
            assert_eq!(m.warping_error(0.5).unwrap(), Some(1.0 / 25.0));
            let report = m.report(0.5, true).unwrap();
            let slice = report.slices[0].as_ref().unwrap();
            assert_eq!(slice.kinds, vec![MismatchKind::ObjectDeletion]);
            assert_eq!(slice.mismatch_image(KindSet::ALL)[(2, 2)], 0x08);
            assert_eq!(slice.mismatch_image(KindSet::SPLITS_AND_MERGERS)[(2, 2)], 0);
        }
    }

    #[test]
    fn test_square_center() {
        let s = square(5, 1, 3);
        let mut t = s.clone();
        t[(2, 2)] = 0.0;
        let (r, p) = (stack(s), stack(t));
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        assert_eq!(m.warping_error(0.5).unwrap(), Some(1.0 / 25.0));

        let report = m.report(0.5, true).unwrap();
        assert_eq!(
            report.slices[0].as_ref().unwrap().kinds,
            vec![MismatchKind::HoleAddition]
        );
        let counts = report.counts();
        assert_eq!(counts.total(KindSet::ALL), 1);
        assert_eq!(counts[MismatchKind::HoleAddition], 1);
    }

    #[test]
    fn test_empty_stack() {
        let e = LabelStack::new(Array3::zeros((0, 5, 5)));
        let m = WarpingMetric::new(&e, &e, cfg()).unwrap();
        assert_eq!(m.warping_error(0.5).unwrap(), None);
        assert_eq!(m.warping_error_single_thread(0.5).unwrap(), None);
        assert_eq!(m.clustered_error(0.5, true, KindSet::ALL).unwrap(), None);
        let range = ThresholdRange::new(0.1, 0.9, 0.4).unwrap();
        assert_eq!(m.min_splits_and_mergers_error(range, true).unwrap(), None);
        assert_eq!(m.report(0.5, false).unwrap().len_z(), 0);
    }

    #[test]
    fn test_argument_errors() {
        let a = LabelStack::new(Array3::zeros((2, 4, 4)));
        let b = LabelStack::new(Array3::zeros((2, 4, 5)));
        assert!(matches!(
            WarpingMetric::new(&a, &b, cfg()),
            Err(WarpError::ShapeMismatch {
                role: StackRole::Proposal,
                ..
            })
        ));
        assert!(matches!(
            WarpingMetric::new(&a, &a, cfg()).unwrap().with_mask(&b),
            Err(WarpError::ShapeMismatch {
                role: StackRole::Mask,
                ..
            })
        ));

        let m = WarpingMetric::new(&a, &a, cfg()).unwrap();
        assert_eq!(
            m.warping_error(-0.5).unwrap_err(),
            WarpError::InvalidThreshold(-0.5)
        );
        assert!(ThresholdRange::new(0.8, 0.2, 0.1).is_err());
    }

    fn assorted_stack() -> (LabelStack, LabelStack) {
        let mut refs = vec![
            Array2::zeros((7, 7)),
            Array2::zeros((7, 7)),
            square(7, 2, 4),
            square(7, 1, 5),
        ];
        let mut props = vec![
            Array2::zeros((7, 7)),
            Array2::ones((7, 7)),
            square(7, 1, 5),
            square(7, 2, 4),
        ];
        refs.push(Array2::from_shape_fn((7, 7), |(h, w)| ((h + w) % 3 == 0) as u8 as f32));
        props.push(Array2::from_shape_fn((7, 7), |(h, w)| {
            ((h * 7 + w * 3) % 5) as f32 / 4.0
        }));
        (
            LabelStack::from_slices(&refs).unwrap(),
            LabelStack::from_slices(&props).unwrap(),
        )
    }

    /// 结果与线程数和调度顺序无关.
    #[test]
    fn test_parallel_matches_single_thread() {
        let (r, p) = assorted_stack();
        let one = WarpingMetric::new(&r, &p, cfg().with_workers(1)).unwrap();
        let many = WarpingMetric::new(&r, &p, cfg().with_workers(4)).unwrap();

        let e1 = one.warping_error(0.5).unwrap();
        assert_eq!(e1, many.warping_error(0.5).unwrap());
        assert_eq!(e1, many.warping_error_single_thread(0.5).unwrap());
        assert_eq!(
            one.report(0.5, true).unwrap(),
            many.report(0.5, true).unwrap()
        );

        let per_slice = many.warp(0.5).unwrap();
        for (z, result) in per_slice.iter().enumerate() {
            let direct = warp_slice(r.slice_at(z), p.slice_at(z), None, 0.5).unwrap();
            assert_eq!(result.as_ref(), Some(&direct));
        }
    }

    /// 聚类数不超过错误点数.
    #[test]
    fn test_clusters_bounded_by_points() {
        let (r, p) = assorted_stack();
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        for t in [0.2, 0.5, 0.8] {
            let by_error = m.report(t, true).unwrap();
            let by_type = m.report(t, false).unwrap();
            for (a, b) in by_error.slices.iter().zip(&by_type.slices) {
                let (a, b) = (a.as_ref().unwrap(), b.as_ref().unwrap());
                for kind in MismatchKind::ALL {
                    assert!(a.counts[kind] <= b.counts[kind]);
                }
                assert_eq!(b.counts.total(KindSet::ALL), b.warping.mismatches.len());
            }
        }
    }

    fn split_and_merge_stack() -> (LabelStack, LabelStack) {
        let mut bar = Array2::<f32>::zeros((5, 5));
        bar.slice_mut(ndarray::s![2, 1..4]).fill(1.0);
        let mut dots = bar.clone();
        dots[(2, 2)] = 0.0;
        (
            LabelStack::from_slices(&[bar.clone(), dots.clone()]).unwrap(),
            LabelStack::from_slices(&[dots, bar]).unwrap(),
        )
    }

    #[test]
    fn test_splits_and_mergers() {
        let (r, p) = split_and_merge_stack();
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        let range = ThresholdRange::new(0.25, 0.75, 0.25).unwrap();

        for by_error in [true, false] {
            let sweep = m.splits_and_mergers(range, by_error).unwrap();
            assert_eq!(sweep.len(), 3);
            for s in &sweep {
                assert_eq!((s.splits, s.mergers), (1, 1));
            }
            assert_eq!(sweep[0].threshold, 0.25);
        }

        let best = m.min_splits_and_mergers_error(range, true).unwrap().unwrap();
        assert_eq!(best.threshold, 0.25);
        assert!(f64_eq(best.value, 2.0 / 50.0));
    }

    #[test]
    fn test_warped_precision_recall() {
        let (r, p) = (stack(square(7, 2, 4)), stack(square(7, 1, 5)));
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        let s = m.precision_recall_stats(0.5).unwrap();
        assert_eq!((s.true_positives, s.true_negatives), (25, 24));
        assert_eq!((s.false_positives, s.false_negatives), (0, 0));
        assert_eq!(s.metric_value, 0.0);

        let range = ThresholdRange::new(0.25, 0.75, 0.25).unwrap();
        let best = m.max_f_score(range).unwrap();
        assert_eq!(best.threshold, 0.25);
        assert_eq!(best.value, 1.0);
    }

    #[test]
    fn test_dual_precision_recall() {
        let sq = stack(square(7, 2, 4));
        let m = WarpingMetric::new(&sq, &sq, cfg()).unwrap();
        let s = m.dual_precision_recall_stats(0.5).unwrap();
        assert_eq!(s.true_positives, 18);
        assert_eq!(s.true_negatives, 80);
        assert_eq!(s.metric_value, 0.0);
        assert_eq!(s.f_score(), 1.0);

        let (r, p) = (stack(square(7, 2, 4)), stack(square(7, 1, 5)));
        let m = WarpingMetric::new(&r, &p, cfg()).unwrap();
        let s = m.dual_precision_recall_stats(0.5).unwrap();
        assert_eq!(s.total(), 2 * 49);
        let range = ThresholdRange::new(0.25, 0.75, 0.25).unwrap();
        assert_eq!(m.dual_precision_recall_sweep(range).unwrap().len(), 3);
        let best = m.dual_max_f_score(range).unwrap();
        assert!(best.value > 0.0 && best.value <= 1.0);
    }

    /// 失败切片贡献 0, 但仍计入切片数.
    #[test]
    fn test_degraded_report() {
        let ok = SliceReport {
            warping: WarpingResult {
                warped: Array2::zeros((2, 2)),
                error: 0.5,
                mismatches: Vec::new(),
                pass_counts: vec![2, 2],
            },
            kinds: Vec::new(),
            counts: {
                let mut c = ClusteredMismatchCounts::default();
                c[MismatchKind::Split] = 2;
                c
            },
        };
        let report = WarpingReport {
            threshold: 0.5,
            slices: vec![Some(ok), None],
            slice_size: 4,
        };
        assert_eq!(report.failed(), vec![1]);
        assert_eq!(report.warping_error(), Some(0.25));
        assert_eq!(report.clustered_error(KindSet::ALL), Some(0.25));
    }
}
