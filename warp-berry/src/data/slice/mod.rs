//! 二维切片对象的操作.

mod core;
mod iter;

pub use self::core::{Binarization, LabelSlice, OwnedLabelSlice};

pub use iter::PosIter;
