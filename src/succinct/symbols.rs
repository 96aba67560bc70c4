use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use simple_sds::bit_vector::BitVector;
use simple_sds::ops::{BitVec, Rank, Select};
use simple_sds::serialize::Serialize;
use std::io::{Read, Write};

/// 字节序列的逐符号位图表示。
///
/// 每个出现过的符号对应一条 simple_sds 位向量，第 i 位为 1 表示序列第 i 个
/// 字节就是该符号。BWT 的字母表很小（`$ACGTN`），`rank` / `select` 是单次
/// 位向量查询，`access` 与 `interval_symbols` 只需扫描字母表。
#[derive(Debug, Clone)]
pub struct SymbolVectors {
    /// 升序排列的不同符号，与 `vectors` 一一对应
    alphabet: Vec<u8>,
    vectors: Vec<BitVector>,
    len: usize,
}

fn with_support(mut bv: BitVector) -> BitVector {
    bv.enable_rank();
    bv.enable_select();
    bv
}

impl SymbolVectors {
    pub fn new(data: &[u8]) -> Self {
        let mut seen = [false; 256];
        for &b in data {
            seen[b as usize] = true;
        }
        let alphabet: Vec<u8> = (0..=255u8).filter(|&b| seen[b as usize]).collect();
        let vectors = alphabet
            .iter()
            .map(|&a| with_support(data.iter().map(|&b| b == a).collect()))
            .collect();
        Self {
            alphabet,
            vectors,
            len: data.len(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 出现过的符号，升序
    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    #[inline]
    fn vector_of(&self, symbol: u8) -> Option<&BitVector> {
        let slot = self.alphabet.binary_search(&symbol).ok()?;
        Some(&self.vectors[slot])
    }

    /// 位置 `i` 上的符号
    pub fn access(&self, i: usize) -> u8 {
        debug_assert!(i < self.len, "position {} out of range {}", i, self.len);
        self.vectors
            .iter()
            .position(|v| v.get(i))
            .map_or(0, |slot| self.alphabet[slot])
    }

    /// `[0, i)` 中 `symbol` 的出现次数
    pub fn rank(&self, symbol: u8, i: usize) -> usize {
        match self.vector_of(symbol) {
            Some(v) if i >= self.len => v.count_ones(),
            Some(v) => v.rank(i),
            None => 0,
        }
    }

    /// 整个序列中 `symbol` 的出现次数
    #[inline]
    pub fn count(&self, symbol: u8) -> usize {
        self.vector_of(symbol).map_or(0, |v| v.count_ones())
    }

    /// 第 `k` 个 `symbol` 的位置（k 从 1 开始）；不存在时返回 None。
    pub fn select(&self, symbol: u8, k: usize) -> Option<usize> {
        let v = self.vector_of(symbol)?;
        v.select(k.checked_sub(1)?)
    }

    /// `[left, right]`（闭区间）中出现的不同符号，升序
    pub fn interval_symbols(&self, left: usize, right: usize) -> Vec<u8> {
        if left > right || right >= self.len {
            return Vec::new();
        }
        self.alphabet
            .iter()
            .zip(&self.vectors)
            .filter(|(_, v)| v.rank(left) < self.rank_to(v, right + 1))
            .map(|(&a, _)| a)
            .collect()
    }

    #[inline]
    fn rank_to(&self, v: &BitVector, i: usize) -> usize {
        if i >= self.len {
            v.count_ones()
        } else {
            v.rank(i)
        }
    }

    /// 长度、字母表（小端 u64 计数）之后依次是各符号的 simple_sds 位向量
    pub fn serialize<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u64::<LittleEndian>(self.len as u64)?;
        out.write_u64::<LittleEndian>(self.alphabet.len() as u64)?;
        out.write_all(&self.alphabet)?;
        for v in &self.vectors {
            v.serialize(out)?;
        }
        Ok(())
    }

    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        let len = input.read_u64::<LittleEndian>()? as usize;
        let sigma = input.read_u64::<LittleEndian>()? as usize;
        if sigma > 256 {
            bail!("symbol table claims {} symbols", sigma);
        }
        let mut alphabet = vec![0u8; sigma];
        input.read_exact(&mut alphabet)?;
        if alphabet.windows(2).any(|w| w[0] >= w[1]) {
            bail!("symbol table is not strictly ascending");
        }

        let mut vectors = Vec::with_capacity(sigma);
        let mut total = 0usize;
        for &a in &alphabet {
            let v = BitVector::load(input)
                .with_context(|| format!("cannot decode bit vector of symbol '{}'", a as char))?;
            if v.len() != len {
                bail!(
                    "bit vector of symbol '{}' has {} bits, expected {}",
                    a as char,
                    v.len(),
                    len
                );
            }
            total += v.count_ones();
            vectors.push(with_support(v));
        }
        if total != len {
            bail!("symbol bit vectors mark {} positions out of {}", total, len);
        }
        Ok(Self {
            alphabet,
            vectors,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_rank(data: &[u8], c: u8, i: usize) -> usize {
        data[..i].iter().filter(|&&b| b == c).count()
    }

    #[test]
    fn access_rank_select_on_dna() {
        let data = b"AGC$TTAC$GA";
        let sv = SymbolVectors::new(data);
        assert_eq!(sv.len(), data.len());
        assert_eq!(sv.alphabet(), b"$ACGT");

        for (i, &b) in data.iter().enumerate() {
            assert_eq!(sv.access(i), b);
        }
        for &c in b"$ACGTN" {
            for i in 0..=data.len() {
                assert_eq!(
                    sv.rank(c, i),
                    naive_rank(data, c, i),
                    "rank({}, {})",
                    c as char,
                    i
                );
            }
            let positions: Vec<usize> = data
                .iter()
                .enumerate()
                .filter(|&(_, &b)| b == c)
                .map(|(i, _)| i)
                .collect();
            for (k, &p) in positions.iter().enumerate() {
                assert_eq!(sv.select(c, k + 1), Some(p));
            }
            assert_eq!(sv.select(c, 0), None);
            assert_eq!(sv.select(c, positions.len() + 1), None);
            assert_eq!(sv.count(c), positions.len());
        }
    }

    #[test]
    fn interval_symbols_are_distinct_and_sorted() {
        let sv = SymbolVectors::new(b"TTGAC$AT");
        assert_eq!(sv.interval_symbols(0, 1), b"T".to_vec());
        assert_eq!(sv.interval_symbols(0, 3), b"AGT".to_vec());
        assert_eq!(sv.interval_symbols(2, 7), b"$ACGT".to_vec());
        assert_eq!(sv.interval_symbols(5, 5), b"$".to_vec());
        assert!(sv.interval_symbols(3, 8).is_empty());

        let empty = SymbolVectors::new(b"");
        assert!(empty.is_empty());
        assert!(empty.alphabet().is_empty());
        assert_eq!(empty.rank(b'A', 0), 0);
    }

    #[test]
    fn serialize_then_load() {
        let data = b"ACGTTGCA$NNACGT$";
        let sv = SymbolVectors::new(data);
        let mut buf = Vec::new();
        sv.serialize(&mut buf).unwrap();

        let loaded = SymbolVectors::load(&mut &buf[..]).unwrap();
        assert_eq!(loaded.alphabet(), sv.alphabet());
        for i in 0..=data.len() {
            for &c in sv.alphabet() {
                assert_eq!(loaded.rank(c, i), sv.rank(c, i));
            }
        }
        for i in 0..data.len() {
            assert_eq!(loaded.access(i), data[i]);
        }

        let mut again = Vec::new();
        loaded.serialize(&mut again).unwrap();
        assert_eq!(again, buf);
    }

    #[test]
    fn truncated_or_inconsistent_input_is_an_error() {
        let mut buf = Vec::new();
        SymbolVectors::new(b"ACGT$").serialize(&mut buf).unwrap();
        assert!(SymbolVectors::load(&mut &buf[..buf.len() - 3]).is_err());

        // 字母表被篡改为非升序
        let mut bad = buf.clone();
        bad[16] = b'Z';
        assert!(SymbolVectors::load(&mut &bad[..]).is_err());
    }
}
