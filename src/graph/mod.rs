//! 建立在自索引之上的隐式 k-mer 图。
//!
//! 节点是前 k 个字符相同的极大 SA 区间，由边界向量 `first` 划分
//! （simple_sds 的 Elias-Fano 稀疏向量，1 的个数即节点数）；
//! 节点从不显式存储，只是共享索引上的轻量 [`Interval`] 值。
//!
//! 方向约定：`outgoing` 沿反向搜索扩展（文本中的前驱 k-mer），
//! `incoming` 沿逆 LF（文本中的后继 k-mer）。

mod store;

pub use store::IndexMeta;

use anyhow::{bail, Result};
use log::info;
use simple_sds::ops::{BitVec, Rank, Select};
use simple_sds::sparse_vector::{SparseBuilder, SparseVector};
use std::sync::Arc;

use crate::index::{lcp, IndexConfig, Interval, SelfIndex};

#[derive(Debug, Clone)]
pub struct Graph {
    k: usize,
    index: Arc<SelfIndex>,
    /// `first[i]` 为 1 表示第 i 行开始一个新节点
    first: SparseVector,
    meta: IndexMeta,
}

/// 由升序的节点起点构建长度为 `len` 的边界向量
pub fn boundary_vector(len: usize, starts: &[usize]) -> Result<SparseVector> {
    let mut builder = SparseBuilder::new(len, starts.len()).map_err(anyhow::Error::msg)?;
    for &p in starts {
        builder.try_set(p).map_err(anyhow::Error::msg)?;
    }
    SparseVector::try_from(builder).map_err(anyhow::Error::msg)
}

impl Graph {
    /// 由 LCP 数组推导节点边界：`first[i] = (i == 0 || lcp[i] < k)`。
    pub fn build(index: Arc<SelfIndex>, k: usize, lcp: &[usize]) -> Result<Self> {
        if lcp.len() != index.size() {
            bail!(
                "LCP array has {} entries but the index has {} rows",
                lcp.len(),
                index.size()
            );
        }
        let starts: Vec<usize> = lcp
            .iter()
            .enumerate()
            .filter(|&(i, &l)| i == 0 || l < k)
            .map(|(i, _)| i)
            .collect();
        let first = boundary_vector(lcp.len(), &starts)?;
        Self::new(k, index, first, IndexMeta::default())
    }

    /// 从流、后缀数组一次性构建索引与图；LCP 用完即丢弃。
    pub fn from_text(text: &[u8], sa: &[usize], k: usize, config: IndexConfig) -> Result<Self> {
        let index = Arc::new(SelfIndex::build(text, sa, config)?);
        let lcp = lcp::build_lcp(text, sa);
        Self::build(index, k, &lcp)
    }

    pub fn new(
        k: usize,
        index: Arc<SelfIndex>,
        first: SparseVector,
        meta: IndexMeta,
    ) -> Result<Self> {
        if k == 0 {
            bail!("k must be positive");
        }
        if first.len() != index.size() {
            bail!(
                "boundary vector has {} bits but the index has {} rows",
                first.len(),
                index.size()
            );
        }
        if !first.get(0) {
            bail!("boundary vector does not start a node at row 0");
        }
        let graph = Self {
            k,
            index,
            first,
            meta,
        };
        info!(
            "graph: k={}, {} rows, {} nodes",
            k,
            graph.size(),
            graph.node_count()
        );
        Ok(graph)
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.index.size()
    }

    pub fn index(&self) -> &SelfIndex {
        &self.index
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = meta;
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.first.count_ones()
    }

    /// 节点编号：`left` 之前的节点数，稠密地落在 `[0, node_count())`
    #[inline]
    pub fn rank(&self, node: Interval) -> usize {
        self.starts_before(node.left)
    }

    /// `[0, i)` 中的节点起点数
    #[inline]
    fn starts_before(&self, i: usize) -> usize {
        if i >= self.first.len() {
            self.first.count_ones()
        } else {
            self.first.rank(i)
        }
    }

    /// 第 `r` 个节点（r 从 1 开始）的起点；`r == node_count() + 1` 时为 `size()`
    #[inline]
    fn node_start(&self, r: usize) -> usize {
        self.first.select(r - 1).unwrap_or(self.size())
    }

    /// 编号为 `rank` 的节点
    pub fn node(&self, rank: usize) -> Interval {
        Interval::new(self.node_start(rank + 1), self.node_start(rank + 2) - 1)
    }

    /// 包含第 `pos` 行的节点
    pub fn enclosing(&self, pos: usize) -> Interval {
        let r = self.starts_before(pos + 1);
        Interval::new(self.node_start(r), self.node_start(r + 1) - 1)
    }

    fn is_aligned(&self, interval: Interval) -> bool {
        self.first.get(interval.left)
            && (interval.right + 1 == self.size() || self.first.get(interval.right + 1))
    }

    /// 出现次数不少于 `min_frequency` 的全部节点，按编号顺序。
    ///
    /// 含跨越分隔符的伪节点（`label` 为 None），由调用方过滤。
    pub fn distinct_kmers(&self, min_frequency: usize) -> Vec<Interval> {
        (0..self.node_count())
            .map(|r| self.node(r))
            .filter(|n| n.frequency() >= min_frequency)
            .collect()
    }

    /// 节点的 k 个字符（文本顺序）；k 个字符内遇到分隔符则返回 None。
    pub fn label(&self, node: Interval) -> Option<Vec<u8>> {
        let sentinel = self.index.sentinel();
        let mut buf = vec![0u8; self.k];
        let mut interval = node;
        for slot in buf.iter_mut() {
            let (next, symbol) = self.index.inverse_lf_interval(interval);
            if symbol == sentinel {
                return None;
            }
            *slot = symbol;
            interval = next;
        }
        Some(buf)
    }

    #[inline]
    pub fn is_artifact(&self, node: Interval) -> bool {
        self.label(node).is_none()
    }

    /// 沿符号 `symbol` 走一条边：先反向扩展，再对齐到包含它的节点。
    ///
    /// 扩展得到的是 (k+1)-mer 的区间，它落在其前 k 个字符所属节点的内部，
    /// 需要放宽到该节点的边界。
    pub fn follow_edge(&self, node: Interval, symbol: u8) -> Option<Interval> {
        let e = self.index.extend(node, symbol)?;
        if self.is_aligned(e) {
            return Some(e);
        }
        let left = self.enclosing(e.left).left;
        let right = self.enclosing(e.right).right;
        Some(Interval::new(left, right))
    }

    /// 前驱节点：节点内每个不同的非分隔符 BWT 符号对应一条边，不去重。
    pub fn outgoing(&self, node: Interval) -> Vec<Interval> {
        self.outgoing_solid(node, 0)
    }

    pub fn outgoing_solid(&self, node: Interval, solid: usize) -> Vec<Interval> {
        let sentinel = self.index.sentinel();
        self.index
            .interval_symbols(node.left, node.right)
            .into_iter()
            .filter(|&c| c != sentinel)
            .filter_map(|c| self.follow_edge(node, c))
            .filter(|n| n.frequency() >= solid)
            .collect()
    }

    /// 后继节点：节点内每一行经逆 LF 落到的节点，去重后按首次出现顺序返回。
    pub fn incoming(&self, node: Interval) -> Vec<Interval> {
        self.incoming_solid(node, 0)
    }

    pub fn incoming_solid(&self, node: Interval, solid: usize) -> Vec<Interval> {
        let sentinel = self.index.sentinel();
        let mut edges: Vec<Interval> = Vec::new();
        let mut i = node.left;
        while i <= node.right {
            let (p, symbol) = self.index.inverse_lf(i);
            if symbol == sentinel {
                // 以分隔符开头的伪节点没有后继
                break;
            }
            if p == 0 {
                i += 1;
                continue;
            }
            let n = self.enclosing(p);
            if n.frequency() >= solid && !edges.contains(&n) {
                edges.push(n);
            }
            // 节点内首字符相同，逆 LF 单调：落到 n 的行恰好是 symbol + n 的区间
            i = match self.index.extend(n, symbol) {
                Some(e) if e.contains(i) => e.right.min(node.right) + 1,
                _ => i + 1,
            };
        }
        edges
    }

    #[inline]
    pub fn indegree(&self, node: Interval, solid: usize) -> usize {
        self.incoming_solid(node, solid).len()
    }

    #[inline]
    pub fn outdegree(&self, node: Interval, solid: usize) -> usize {
        self.outgoing_solid(node, solid).len()
    }

    /// 该 k-mer 在原始流中的全部起始位置
    pub fn occurrences(&self, node: Interval) -> Vec<usize> {
        node.positions().map(|j| self.index.sa(j)).collect()
    }
}
