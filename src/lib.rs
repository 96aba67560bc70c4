//! # wanda
//!
//! 基于 FM 索引的隐式 k-mer 图与 unitig 组装。
//!
//! 所有 read 以 `$` 拼接成一条流，建立一次自索引（逐符号 rank/select 的 BWT + 稀疏 SA 采样）；
//! 对任意 k，k-mer 图的节点就是前 k 个字符相同的极大 SA 区间，
//! 边通过反向扩展与逆 LF 在查询时即时计算，不显式存储。
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use wanda::assemble::{assemble, AssembleOpt};
//! use wanda::graph::Graph;
//! use wanda::index::{sa, IndexConfig};
//!
//! let text = b"ACGTACGA$";
//! let sa_arr = sa::build_sa(text);
//! let graph = Graph::from_text(text, &sa_arr, 3, IndexConfig::default()).unwrap();
//!
//! let opt = AssembleOpt {
//!     solid: 0,
//!     min_length: 3,
//!     threads: 1,
//! };
//! for u in assemble(&graph, &opt).unwrap() {
//!     println!("{}", String::from_utf8_lossy(&u.seq));
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`succinct`] — simple_sds 上的逐符号 rank/select、并发 visited 位集合
//! - [`index`] — 后缀数组、BWT、自索引、LCP、sa5 编码与外部构建器
//! - [`graph`] — 节点边界稀疏向量上的 k-mer 图
//! - [`assemble`] — unitig 组装与 FASTA 输出
//! - [`build`] — 从流到磁盘索引的构建流程
//! - [`io`] — FASTA / FASTQ 解析与流拼接
//! - [`util`] — 序列归一化

pub mod assemble;
pub mod build;
pub mod graph;
pub mod index;
pub mod io;
pub mod succinct;
pub mod util;
