use std::sync::atomic::{AtomicU64, Ordering};

/// 定长位集合，每一位可以被多个线程并发地原子置位。
///
/// 拼接 unitig 时用作 visited 标记：`test_and_set` 把“检查”和“标记”
/// 合并为一次 `fetch_or`，两个线程不会同时认领同一个节点。
#[derive(Debug)]
pub struct AtomicBitSet {
    words: Vec<AtomicU64>,
    len: usize,
}

impl AtomicBitSet {
    pub fn new(len: usize) -> Self {
        let words = (0..len.div_ceil(64)).map(|_| AtomicU64::new(0)).collect();
        Self { words, len }
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        self.words[i / 64].load(Ordering::Acquire) & (1u64 << (i % 64)) != 0
    }

    /// 置位并返回旧值；返回 false 表示本次调用认领了该位。
    #[inline]
    pub fn test_and_set(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        let mask = 1u64 << (i % 64);
        self.words[i / 64].fetch_or(mask, Ordering::AcqRel) & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    fn count_ones(set: &AtomicBitSet) -> usize {
        (0..set.len).filter(|&i| set.get(i)).count()
    }

    #[test]
    fn test_and_set_claims_once() {
        let set = AtomicBitSet::new(130);
        assert!(!set.get(129));
        assert!(!set.test_and_set(129));
        assert!(set.test_and_set(129));
        assert!(set.get(129));
        assert!(!set.get(128));
        assert_eq!(count_ones(&set), 1);
    }

    #[test]
    fn concurrent_claims_are_exclusive() {
        let set = AtomicBitSet::new(1000);
        let claimed: usize = (0..8)
            .into_par_iter()
            .map(|_| (0..1000).filter(|&i| !set.test_and_set(i)).count())
            .sum();
        assert_eq!(claimed, 1000);
        assert_eq!(count_ones(&set), 1000);
    }
}
