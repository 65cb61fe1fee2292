//! 多切片评估入口.
//!
//! 所有入口都先检查输入形状与阈值, 再把每张切片复制成独立任务交给
//! [`crate::driver::SliceDriver`], 最后单线程汇总.
//! 没有任何切片时, 标量误差返回 `None` (旧接口中的 `-1`).

use crate::config::MetricConfig;
use crate::data::{LabelStack, OwnedLabelSlice};
use crate::driver::{settle, SliceDriver};
use crate::WarpResult;

mod pixel;
mod range;
mod stats;
mod warping;

pub use pixel::PixelErrorMetric;
pub use range::ThresholdRange;
pub use stats::ClassificationStatistics;
pub use warping::{SliceReport, SplitsAndMergers, WarpingMetric, WarpingReport};

cfg_if::cfg_if! {
    if #[cfg(feature = "serde")] {
        use serde::{Deserialize, Serialize};
    }
}

/// 阈值扫描中的最优点.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BestThreshold {
    /// 取得最优值的阈值.
    pub threshold: f64,

    /// 最优值.
    pub value: f64,
}

/// 一张切片的全部输入, 由任务独占.
#[derive(Debug)]
pub(crate) struct SliceTask {
    pub source: OwnedLabelSlice,
    pub target: OwnedLabelSlice,
    pub mask: Option<OwnedLabelSlice>,
}

/// 把三个同形状的栈拆成逐切片任务.
pub(crate) fn slice_tasks(
    source: &LabelStack,
    target: &LabelStack,
    mask: Option<&LabelStack>,
) -> Vec<SliceTask> {
    let mut masks = mask.map(|m| m.to_owned_slices().into_iter());
    source
        .to_owned_slices()
        .into_iter()
        .zip(target.to_owned_slices())
        .map(|(source, target)| SliceTask {
            source,
            target,
            mask: masks.as_mut().and_then(Iterator::next),
        })
        .collect()
}

/// 并行执行逐切片任务, 并按失败策略整理. 失败切片为 `None`.
pub(crate) fn run_slices<T, F>(
    config: &MetricConfig,
    tasks: Vec<SliceTask>,
    job: F,
) -> WarpResult<Vec<Option<T>>>
where
    T: Send + 'static,
    F: Fn(SliceTask) -> WarpResult<T> + Send + Sync + 'static,
{
    let outcomes = SliceDriver::new(config.workers).run(tasks, move |_, task| job(task));
    settle(outcomes, config.failure_policy)?
        .into_iter()
        .map(Option::transpose)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::WarpError;
    use ndarray::Array3;

    /// 第 `z` 张切片的像素全为 `z`.
    fn numbered_stack(n: usize) -> LabelStack {
        LabelStack::new(Array3::from_shape_fn((n, 2, 2), |(z, _, _)| z as f32))
    }

    fn job(task: SliceTask) -> WarpResult<f32> {
        let v = task.source.as_slice()[(0, 0)];
        if v == 2.0 {
            panic!("slice job failed");
        }
        Ok(v + task.target.as_slice()[(1, 1)])
    }

    #[test]
    fn test_slice_tasks_keep_order() {
        let a = numbered_stack(3);
        let mask = numbered_stack(3);
        let tasks = slice_tasks(&a, &a, Some(&mask));
        assert_eq!(tasks.len(), 3);
        for (z, task) in tasks.iter().enumerate() {
            assert_eq!(task.source.as_slice()[(0, 0)], z as f32);
            assert_eq!(task.mask.as_ref().unwrap().as_slice()[(1, 0)], z as f32);
        }
        assert!(slice_tasks(&a, &a, None).iter().all(|t| t.mask.is_none()));
    }

    #[test]
    fn test_abort_on_panicking_slice() {
        let a = numbered_stack(4);
        let config = MetricConfig::default()
            .with_workers(2)
            .with_failure_policy(FailurePolicy::Abort);
        let err = run_slices(&config, slice_tasks(&a, &a, None), job).unwrap_err();
        assert_eq!(
            err,
            WarpError::SliceFailed {
                index: 2,
                message: String::from("slice job failed"),
            }
        );
    }

    #[test]
    fn test_degrade_on_panicking_slice() {
        let a = numbered_stack(4);
        let config = MetricConfig::default().with_workers(2);
        let out = run_slices(&config, slice_tasks(&a, &a, None), job).unwrap();
        assert_eq!(out, vec![Some(0.0), Some(2.0), None, Some(6.0)]);
    }

    /// 任务返回的错误不受失败策略影响, 直接传出.
    #[test]
    fn test_job_error_propagates() {
        let a = numbered_stack(2);
        let config = MetricConfig::default().with_workers(1);
        let err = run_slices(&config, slice_tasks(&a, &a, None), |_| -> WarpResult<()> {
            Err(WarpError::InvalidThreshold(2.0))
        })
        .unwrap_err();
        assert_eq!(err, WarpError::InvalidThreshold(2.0));
    }
}
