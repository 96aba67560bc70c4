use anyhow::{Context, Result};
use log::{debug, info};
use rayon::prelude::*;

use super::AssembleOpt;
use crate::graph::Graph;
use crate::index::Interval;
use crate::succinct::AtomicBitSet;

/// 每个 rayon 任务处理的连续节点数
const CHUNK_NODES: usize = 1024;

/// 一条极大非分支路径及其拼出的序列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unitig {
    pub path: Vec<Interval>,
    pub seq: Vec<u8>,
}

impl Unitig {
    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// 在图上沿文本方向行走；`visited` 按节点编号记录已被某条路径占用的节点。
struct Walker<'a> {
    graph: &'a Graph,
    solid: usize,
    visited: &'a AtomicBitSet,
}

impl Walker<'_> {
    /// 文本中的后继，去掉伪节点
    fn succ(&self, node: Interval) -> Vec<Interval> {
        let mut out = self.graph.incoming_solid(node, self.solid);
        out.retain(|&n| !self.graph.is_artifact(n));
        out
    }

    /// 文本中的前驱
    fn pred(&self, node: Interval) -> Vec<Interval> {
        self.graph.outgoing_solid(node, self.solid)
    }

    /// 唯一前驱且该前驱只有这一个后继时，节点接在前驱的路径里，不是起点
    fn is_head(&self, node: Interval) -> bool {
        match self.pred(node).as_slice() {
            [u] => self.succ(*u).len() != 1,
            _ => true,
        }
    }

    /// 从 `start` 出发向后延伸；调用方已占用 `start`
    fn walk(&self, start: Interval) -> Vec<Interval> {
        let mut path = vec![start];
        let mut cur = start;
        loop {
            let n = match self.succ(cur).as_slice() {
                [n] => *n,
                _ => break,
            };
            if n == start || self.pred(n).len() != 1 {
                break;
            }
            if self.visited.test_and_set(self.graph.rank(n)) {
                break;
            }
            path.push(n);
            cur = n;
        }
        path
    }

    fn emit(&self, path: Vec<Interval>, min_length: usize, out: &mut Vec<Unitig>) {
        if self.graph.k() + path.len() - 1 < min_length {
            return;
        }
        match spell(self.graph, &path) {
            Some(seq) => out.push(Unitig { path, seq }),
            None => debug!("path starting at {} crosses a sentinel, dropped", path[0]),
        }
    }
}

/// 首节点的标签，再逐个接上后续节点标签的末字符
fn spell(graph: &Graph, path: &[Interval]) -> Option<Vec<u8>> {
    let (&head, rest) = path.split_first()?;
    let mut seq = graph.label(head)?;
    seq.reserve(rest.len());
    for &n in rest {
        seq.push(*graph.label(n)?.last()?);
    }
    Some(seq)
}

/// 计算所有长度不少于 `min_length` 的 unitig。
///
/// 第一轮并行地从每个起点出发行走；第二轮顺序处理剩下的节点，
/// 它们只能位于没有分支的孤立环上。结果顺序不固定。
pub fn assemble(graph: &Graph, opt: &AssembleOpt) -> Result<Vec<Unitig>> {
    let candidates: Vec<Interval> = graph
        .distinct_kmers(opt.solid)
        .into_iter()
        .filter(|&n| !graph.is_artifact(n))
        .collect();
    info!("{} nodes with frequency >= {}", candidates.len(), opt.solid);

    let visited = AtomicBitSet::new(graph.node_count());
    let walker = Walker {
        graph,
        solid: opt.solid,
        visited: &visited,
    };

    let heads_pass = |chunk: &[Interval]| -> Vec<Unitig> {
        let mut local = Vec::new();
        for &node in chunk {
            let rank = graph.rank(node);
            if visited.get(rank) || !walker.is_head(node) {
                continue;
            }
            if visited.test_and_set(rank) {
                continue;
            }
            let path = walker.walk(node);
            walker.emit(path, opt.min_length, &mut local);
        }
        local
    };

    let mut unitigs: Vec<Unitig> = if opt.threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opt.threads)
            .build()
            .context("cannot start the assembly thread pool")?;
        pool.install(|| {
            candidates
                .par_chunks(CHUNK_NODES)
                .flat_map_iter(heads_pass)
                .collect()
        })
    } else {
        heads_pass(&candidates)
    };
    let from_heads = unitigs.len();

    for &node in &candidates {
        if visited.test_and_set(graph.rank(node)) {
            continue;
        }
        let path = walker.walk(node);
        walker.emit(path, opt.min_length, &mut unitigs);
    }
    debug!(
        "{} unitigs from chain heads, {} from cycles",
        from_heads,
        unitigs.len() - from_heads
    );
    info!("{} unitigs", unitigs.len());
    Ok(unitigs)
}
