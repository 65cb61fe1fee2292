//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{Binarization, LabelSlice, LabelStack, OwnedLabelSlice};
pub use crate::{WarpError, WarpResult};

pub use crate::config::{ClassifyRadius, FailurePolicy, MetricConfig};
pub use crate::consts::{ElemType, DEFAULT_THRESHOLD, NOT_COMPUTED};

pub use crate::components::{Adjacency, ComponentMap};
pub use crate::mismatch::{ClusteredMismatchCounts, KindSet, MismatchKind};
pub use crate::warp::{MismatchPoint, SlicePointWarper, WarpingResult};

pub use crate::metric::{
    BestThreshold, ClassificationStatistics, PixelErrorMetric, ThresholdRange, WarpingMetric,
};
