/// 构建后缀数组（倍增法，每轮一次 O(n log n) 排序）。
///
/// 直接按字节值比较，较短的后缀排在前面，与外部 SA 构建器的约定一致；
/// 流中的多个 `$` 只是普通字节。用于中小规模输入和测试，
/// 大规模输入应交给外部构建器（见 [`super::sa_builder`]）。
pub fn build_sa(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<i64> = text.iter().map(|&b| i64::from(b)).collect();
    let mut tmp: Vec<i64> = vec![0; n];

    let key = |rank: &[i64], i: usize, k: usize| -> (i64, i64) {
        (rank[i], if i + k < n { rank[i + k] } else { -1 })
    };

    let mut k = 1usize;
    loop {
        sa.sort_unstable_by_key(|&i| key(&rank, i, k));

        tmp[sa[0]] = 0;
        for w in 1..n {
            let (a, b) = (sa[w - 1], sa[w]);
            tmp[b] = tmp[a] + i64::from(key(&rank, a, k) != key(&rank, b, k));
        }
        rank.copy_from_slice(&tmp);

        // 所有名次互不相同即排序完成
        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }

    sa
}
