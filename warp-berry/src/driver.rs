//! 逐切片并行执行.
//!
//! 每次调用新建一个固定大小的线程池, 每张切片一个任务, 全部结束后统一汇合,
//! 结果按切片序号排列, 与调度顺序无关. 单个任务 panic 只影响它自己的结果.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};

use log::{error, warn};
use threadpool::ThreadPool;

use crate::config::FailurePolicy;
use crate::{WarpError, WarpResult};

/// 可用并行度.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 一个失败的切片任务.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SliceFailure {
    /// 切片序号.
    pub index: usize,

    /// panic 信息.
    pub message: String,
}

impl From<SliceFailure> for WarpError {
    fn from(f: SliceFailure) -> Self {
        Self::SliceFailed {
            index: f.index,
            message: f.message,
        }
    }
}

/// 单个切片任务的结果.
pub type SliceOutcome<T> = Result<T, SliceFailure>;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("unknown panic")
    }
}

/// 切片任务驱动器.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SliceDriver {
    workers: usize,
}

impl Default for SliceDriver {
    fn default() -> Self {
        Self::new(cpus())
    }
}

impl SliceDriver {
    /// `workers` 个线程, 至少为 1.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// 线程数.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 对每个输入执行 `job(index, input)`, 按输入顺序返回结果.
    ///
    /// 输入必须拥有所有权, 以便移动到工作线程中.
    pub fn run<I, T, F>(&self, inputs: Vec<I>, job: F) -> Vec<SliceOutcome<T>>
    where
        I: Send + 'static,
        T: Send + 'static,
        F: Fn(usize, I) -> T + Send + Sync + 'static,
    {
        let n = inputs.len();
        if n == 0 {
            return Vec::new();
        }

        let pool = ThreadPool::new(self.workers.min(n));
        let (tx, rx) = mpsc::channel();
        let job = Arc::new(job);
        for (index, input) in inputs.into_iter().enumerate() {
            let tx = tx.clone();
            let job = Arc::clone(&job);
            pool.execute(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(index, input)))
                    .map_err(|payload| SliceFailure {
                        index,
                        message: panic_message(payload.as_ref()),
                    });
                // 接收端活到所有任务结束之后.
                let _ = tx.send((index, outcome));
            });
        }
        drop(tx);
        pool.join();

        let mut slots: Vec<Option<SliceOutcome<T>>> = (0..n).map(|_| None).collect();
        for (index, outcome) in rx.try_iter() {
            if let Err(f) = &outcome {
                error!("slice {} failed: {}", f.index, f.message);
            }
            slots[index] = Some(outcome);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    error!("slice {} produced no result", index);
                    Err(SliceFailure {
                        index,
                        message: String::from("no result"),
                    })
                })
            })
            .collect()
    }
}

/// 按失败策略整理结果: `Degrade` 时失败切片为 `None`, `Abort` 时返回第一个失败.
pub fn settle<T>(
    outcomes: Vec<SliceOutcome<T>>,
    policy: FailurePolicy,
) -> WarpResult<Vec<Option<T>>> {
    outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Ok(v) => Ok(Some(v)),
            Err(f) => match policy {
                FailurePolicy::Degrade => {
                    warn!("slice {} is counted as zero: {}", f.index, f.message);
                    Ok(None)
                }
                FailurePolicy::Abort => Err(f.into()),
            },
        })
        .collect()
}
