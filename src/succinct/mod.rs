//! 简洁数据结构：基于 simple_sds 的逐符号 rank/select，以及并发 visited 位集合。

pub mod atomic;
pub mod symbols;

pub use atomic::AtomicBitSet;
pub use symbols::SymbolVectors;
