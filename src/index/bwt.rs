/// 根据后缀数组构建 BWT。
///
/// `bwt[i]` 为后缀 `sa[i]` 前面的那个字符；`sa[i] == 0` 时回绕到文本末字符。
/// 同时返回 primary 行号，即 `sa[i] == 0` 的那一行。
/// 调用方需保证 `sa` 是 `text` 的一个排列。
pub fn build_bwt(text: &[u8], sa: &[usize]) -> (Vec<u8>, usize) {
    let n = text.len();
    let mut bwt = Vec::with_capacity(n);
    let mut primary = 0usize;
    for (row, &p) in sa.iter().enumerate() {
        if p == 0 {
            primary = row;
            bwt.push(text[n - 1]);
        } else {
            bwt.push(text[p - 1]);
        }
    }
    (bwt, primary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bwt_of_small_stream() {
        // ACGTACGA$ 的后缀数组
        let text = b"ACGTACGA$";
        let sa = [8usize, 7, 4, 0, 5, 1, 6, 2, 3];
        let (bwt, primary) = build_bwt(text, &sa);
        assert_eq!(bwt, b"AGT$AACCG".to_vec());
        assert_eq!(primary, 3);
    }
}
