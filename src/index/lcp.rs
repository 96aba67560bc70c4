/// Kasai 算法：由文本和后缀数组线性时间求 LCP 数组。
///
/// `lcp[i]` 为后缀 `sa[i-1]` 与 `sa[i]` 的最长公共前缀长度，`lcp[0] = 0`。
/// 只在建图时使用一次，随后即可丢弃。
pub fn build_lcp(text: &[u8], sa: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut rank = vec![0usize; n];
    for (row, &p) in sa.iter().enumerate() {
        rank[p] = row;
    }

    let mut lcp = vec![0usize; n];
    let mut h = 0usize;
    for p in 0..n {
        let row = rank[p];
        if row == 0 {
            h = 0;
            continue;
        }
        let q = sa[row - 1];
        while p + h < n && q + h < n && text[p + h] == text[q + h] {
            h += 1;
        }
        lcp[row] = h;
        h = h.saturating_sub(1);
    }
    lcp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::sa::build_sa;

    fn naive_lcp(text: &[u8], sa: &[usize]) -> Vec<usize> {
        let mut lcp = vec![0; sa.len()];
        for i in 1..sa.len() {
            lcp[i] = text[sa[i - 1]..]
                .iter()
                .zip(&text[sa[i]..])
                .take_while(|(a, b)| a == b)
                .count();
        }
        lcp
    }

    #[test]
    fn lcp_of_single_read() {
        let text = b"ACGTACGA$";
        let sa = build_sa(text);
        assert_eq!(build_lcp(text, &sa), vec![0, 0, 1, 3, 0, 2, 0, 1, 0]);
    }

    #[test]
    fn lcp_matches_naive() {
        let streams = [
            &b"GATTACA$GATTACA$"[..],
            b"AAAAAAAA$",
            b"ACGTTGCA$TTGCA$ACG$",
            b"$",
        ];
        for text in streams {
            let sa = build_sa(text);
            assert_eq!(build_lcp(text, &sa), naive_lcp(text, &sa));
        }
    }
}
