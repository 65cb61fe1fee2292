#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供二值分割结果的拓扑保持 warping error 评估.
//!
//! 给定真值标签栈 (reference) 和模型输出的概率图栈 (proposal), 先以 simple point
//! 松弛把真值 "扭曲" 到尽量接近 proposal, 再统计剩下无法消除的拓扑错误
//! (合并, 分裂, 孔洞增删, 物体增删).
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 所有索引均采用 `(h, w)` (或三维 `(z, h, w)`) 约定, 与 `ndarray` 一致.
//! 2. 切片之间互相独立, 多切片计算按切片并行, 结果与线程调度顺序无关.
//! 3. 参数非法 (阈值越界, 形状不一致等) 时返回 [`WarpError`], 不会 panic.
//!
//! # 模块
//!
//! ### 连通域标记 ✅
//!
//! 4-邻接与 8-邻接, 支持 3×3 小块上的重复调用 (复用缓冲区).
//!
//! 实现位于 `warp-berry/src/components.rs`.
//!
//! ### Simple point 判定 ✅
//!
//! 基于拓扑数 `T` 与 `T̄` 的二维判定, 前景 4-邻接, 背景 8-邻接.
//!
//! 实现位于 `warp-berry/src/topology.rs`.
//!
//! ### 单切片 warping ✅
//!
//! 按 proposal 与阈值的距离降序翻转 simple point, 直到收敛.
//!
//! 实现位于 `warp-berry/src/warp.rs`.
//!
//! ### 错误分类与聚类 ✅
//!
//! 六类拓扑错误的判定表, 以及按类型或按连通簇计数.
//!
//! 实现位于 `warp-berry/src/mismatch/*`.
//!
//! ### 多切片驱动与评估入口 ✅
//!
//! 固定大小线程池, 每切片一个任务, 单次汇合.
//!
//! 实现位于 `warp-berry/src/driver.rs` 和 `warp-berry/src/metric/*`.

/// 二维索引 `(h, w)`.
pub type Idx2d = (usize, usize);

/// 三维索引 `(z, h, w)`.
pub type Idx3d = (usize, usize, usize);

mod data;

pub use data::{Binarization, LabelSlice, LabelStack, OwnedLabelSlice, PosIter, StackRole};

pub mod components;
pub mod config;
pub mod consts;
pub mod driver;
mod error;
pub mod metric;
pub mod mismatch;
mod neighbour;
pub mod prelude;
pub mod topology;
pub mod warp;

pub use error::{WarpError, WarpResult};
