use serde::{Deserialize, Serialize};

/// 后缀数组上的闭区间 `[left, right]`。
///
/// 既表示一次 backward search 的结果，也表示图中的一个节点
/// （前 k 个字符相同的极大区间）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub left: usize,
    pub right: usize,
}

impl Interval {
    #[inline]
    pub fn new(left: usize, right: usize) -> Self {
        debug_assert!(left <= right, "inverted interval [{}, {}]", left, right);
        Self { left, right }
    }

    /// 区间内的后缀数，即对应 k-mer 的出现次数
    #[inline]
    pub fn frequency(&self) -> usize {
        self.right - self.left + 1
    }

    #[inline]
    pub fn contains(&self, pos: usize) -> bool {
        self.left <= pos && pos <= self.right
    }

    pub fn positions(&self) -> std::ops::RangeInclusive<usize> {
        self.left..=self.right
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}
