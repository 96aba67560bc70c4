//! 自索引：后缀数组、BWT、FM 索引（稀疏 SA 采样）与 LCP。

pub mod bwt;
pub mod fm;
pub mod interval;
pub mod lcp;
pub mod sa;
pub mod sa5;
pub mod sa_builder;

pub use fm::{IndexConfig, SelfIndex, SA_SAMPLE_DENSITY, SENTINEL};
pub use interval::Interval;
