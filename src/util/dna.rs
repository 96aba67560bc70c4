/// 序列归一化：转大写，`U` 视为 `T`，ACGTN 以外的字节（包括分隔符）一律变为 `N`。
pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .map(|&b| match b.to_ascii_uppercase() {
            up @ (b'A' | b'C' | b'G' | b'T' | b'N') => up,
            b'U' => b'T',
            _ => b'N',
        })
        .collect()
}
