use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use simple_sds::raw_vector::{AccessRaw, RawVector};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use super::bwt::build_bwt;
use super::interval::Interval;
use crate::succinct::SymbolVectors;

/// 流中片段之间以及末尾的分隔符
pub const SENTINEL: u8 = b'$';
/// 默认 SA 采样密度：每 32 行保存一个 SA 值
pub const SA_SAMPLE_DENSITY: usize = 32;

/// 建索引时的参数；分隔符与采样密度都随索引一起持久化，
/// 因此用不同参数构建的索引可以共存。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub sentinel: u8,
    pub sample_density: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            sentinel: SENTINEL,
            sample_density: SA_SAMPLE_DENSITY,
        }
    }
}

/// `<prefix>.bwt` 的内容：分隔符（u8）、primary 行（小端 u64），
/// 之后是逐符号位向量
#[derive(Debug)]
struct Bwt {
    sentinel: u8,
    /// `sa[primary] == 0`，该行的 BWT 字符是回绕得到的文本末字符
    primary: usize,
    symbols: SymbolVectors,
}

impl Bwt {
    fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_u8(self.sentinel)?;
        out.write_u64::<LittleEndian>(self.primary as u64)?;
        self.symbols.serialize(out)
    }

    fn read_from<R: std::io::Read>(input: &mut R) -> Result<Self> {
        let sentinel = input.read_u8()?;
        let primary = input.read_u64::<LittleEndian>()? as usize;
        let symbols = SymbolVectors::load(input)?;
        Ok(Self {
            sentinel,
            primary,
            symbols,
        })
    }
}

/// `<prefix>.sa` 的内容
#[derive(Debug, Serialize, Deserialize)]
struct SaSamples {
    density: usize,
    samples: Vec<usize>,
}

/// 基于 BWT 的自索引（FM 索引 + 稀疏 SA 采样）。
///
/// - BWT 按符号拆成 simple_sds 位向量，支持 rank / select / access。
/// - `c[a]` = BWT 中严格小于 `a` 的符号总数，按字节值建 256 项。
/// - SA 只保存行号为 `density` 整数倍处的值，其余通过 LF 回溯恢复。
///
/// 文本必须以分隔符结尾，且不含比分隔符更小的字节，于是单字符后缀 `"$"`
/// 位于第 0 行，`c[sentinel] == 0`。流中可有多个分隔符：primary 行的 `$`
/// 是回绕产生的，不对应任何真实后缀，`lf` / `inverse_lf` / `extend`
/// 在分隔符上都会跳过这一行，从而 LF 在整个 `[0, n)` 上是双射。
#[derive(Debug)]
pub struct SelfIndex {
    bwt: Bwt,
    samples: SaSamples,
    c: Vec<usize>,
}

impl SelfIndex {
    /// 由文本与其后缀数组构建
    pub fn build(text: &[u8], sa: &[usize], config: IndexConfig) -> Result<Self> {
        let n = text.len();
        if n == 0 {
            bail!("cannot index an empty stream");
        }
        if sa.len() != n {
            bail!(
                "suffix array has {} entries but the stream has {} bytes",
                sa.len(),
                n
            );
        }
        if config.sample_density == 0 {
            bail!("suffix array sample density must be positive");
        }
        if text[n - 1] != config.sentinel {
            bail!(
                "stream does not end with the sentinel '{}'",
                config.sentinel as char
            );
        }
        if let Some(&b) = text.iter().find(|&&b| b < config.sentinel) {
            bail!(
                "stream contains byte 0x{:02x}, which sorts before the sentinel '{}'",
                b,
                config.sentinel as char
            );
        }
        check_permutation(sa)?;
        if sa[0] != n - 1 {
            bail!("suffix array does not start with the final sentinel suffix");
        }

        let (bwt, primary) = build_bwt(text, sa);
        let samples: Vec<usize> = sa.iter().step_by(config.sample_density).copied().collect();
        info!(
            "BWT built: {} symbols, primary row {}, {} SA samples (density {})",
            n,
            primary,
            samples.len(),
            config.sample_density
        );

        let bwt = Bwt {
            sentinel: config.sentinel,
            primary,
            symbols: SymbolVectors::new(&bwt),
        };
        let samples = SaSamples {
            density: config.sample_density,
            samples,
        };
        Ok(Self::from_parts(bwt, samples))
    }

    fn from_parts(bwt: Bwt, samples: SaSamples) -> Self {
        // C 表：按字节序累加
        let mut c = vec![0usize; 256];
        let mut acc = 0usize;
        for (a, slot) in c.iter_mut().enumerate() {
            *slot = acc;
            acc += bwt.symbols.count(a as u8);
        }
        debug!(
            "alphabet {:?}",
            String::from_utf8_lossy(bwt.symbols.alphabet())
        );
        Self { bwt, samples, c }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.bwt.symbols.len()
    }

    #[inline]
    pub fn sentinel(&self) -> u8 {
        self.bwt.sentinel
    }

    #[inline]
    pub fn sample_density(&self) -> usize {
        self.samples.density
    }

    /// BWT 中出现的符号，升序
    pub fn alphabet(&self) -> &[u8] {
        self.bwt.symbols.alphabet()
    }

    #[inline]
    pub fn c_array(&self, symbol: u8) -> usize {
        self.c[symbol as usize]
    }

    /// BWT 第 `i` 行的符号
    #[inline]
    pub fn symbol(&self, i: usize) -> u8 {
        self.bwt.symbols.access(i)
    }

    /// BWT `[0, i)` 中真实出现的 `symbol` 个数（分隔符不计 primary 行）
    #[inline]
    fn occ(&self, symbol: u8, i: usize) -> usize {
        let r = self.bwt.symbols.rank(symbol, i);
        if symbol == self.bwt.sentinel && self.bwt.primary < i {
            r - 1
        } else {
            r
        }
    }

    /// 以 `symbol` 开头的后缀所占行区间的起点；分隔符的第 0 行留给 primary
    #[inline]
    fn base(&self, symbol: u8) -> usize {
        self.c[symbol as usize] + usize::from(symbol == self.bwt.sentinel)
    }

    /// LF 映射：第 `i` 行后缀在文本中前移一位后所在的行。
    pub fn lf(&self, i: usize) -> usize {
        if i == self.bwt.primary {
            return 0;
        }
        let symbol = self.symbol(i);
        self.base(symbol) + self.occ(symbol, i)
    }

    /// 逆 LF 映射：第 `i` 行后缀在文本中后移一位后所在的行，
    /// 同时返回第 `i` 行后缀的首字符。
    pub fn inverse_lf(&self, i: usize) -> (usize, u8) {
        let symbol = self.first_symbol(i);
        let sentinel = self.bwt.sentinel;
        if symbol == sentinel {
            if i == 0 {
                return (self.bwt.primary, sentinel);
            }
            // 第 i 个非 primary 的分隔符
            let pos = self.select(sentinel, i);
            let pos = if pos < self.bwt.primary {
                pos
            } else {
                self.select(sentinel, i + 1)
            };
            return (pos, sentinel);
        }
        (self.select(symbol, i - self.c[symbol as usize] + 1), symbol)
    }

    /// 区间形式的逆 LF：两端使用同一个首字符
    pub fn inverse_lf_interval(&self, interval: Interval) -> (Interval, u8) {
        let (left, symbol) = self.inverse_lf(interval.left);
        if interval.left == interval.right {
            return (Interval::new(left, left), symbol);
        }
        let (right, _) = self.inverse_lf(interval.right);
        (Interval::new(left.min(right), left.max(right)), symbol)
    }

    /// C 表区间包含第 `i` 行的那个符号（字母表很小，线性扫描即可）
    fn first_symbol(&self, i: usize) -> u8 {
        let mut symbol = self.bwt.sentinel;
        for &a in self.alphabet() {
            if self.c[a as usize] <= i {
                symbol = a;
            } else {
                break;
            }
        }
        symbol
    }

    /// C 表保证 `k` 不超过该符号的出现次数；越界只可能来自损坏的索引，
    /// 此时返回 `size()`，让后续访问在边界检查处失败。
    fn select(&self, symbol: u8, k: usize) -> usize {
        self.bwt
            .symbols
            .select(symbol, k)
            .unwrap_or_else(|| self.size())
    }

    /// 反向搜索一步：已知串 w 的区间，求 `symbol + w` 的区间；不存在时返回 None。
    pub fn extend(&self, interval: Interval, symbol: u8) -> Option<Interval> {
        let base = self.base(symbol);
        let lo = base + self.occ(symbol, interval.left);
        let hi = base + self.occ(symbol, interval.right + 1);
        if lo >= hi {
            return None;
        }
        Some(Interval::new(lo, hi - 1))
    }

    /// 反向搜索整个模式串，主要供测试与调试使用
    pub fn backward_search(&self, pattern: &[u8]) -> Option<Interval> {
        let mut interval = Interval::new(0, self.size() - 1);
        for &a in pattern.iter().rev() {
            interval = self.extend(interval, a)?;
        }
        Some(interval)
    }

    /// BWT `[left, right]` 中出现的不同符号
    pub fn interval_symbols(&self, left: usize, right: usize) -> Vec<u8> {
        if left == right {
            return vec![self.symbol(left)];
        }
        self.bwt.symbols.interval_symbols(left, right)
    }

    /// 恢复第 `pos` 行的 SA 值：沿 LF 走到最近的采样行，再加上步数。
    pub fn sa(&self, pos: usize) -> usize {
        let density = self.samples.density;
        let mut i = pos;
        let mut steps = 0usize;
        while i % density != 0 {
            i = self.lf(i);
            steps += 1;
        }
        (self.samples.samples[i / density] + steps) % self.size()
    }

    pub fn store(&self, prefix: &str) -> Result<()> {
        let path = format!("{}.bwt", prefix);
        let f = File::create(&path).with_context(|| format!("cannot create '{}'", path))?;
        let mut w = BufWriter::new(f);
        self.bwt
            .write_to(&mut w)
            .with_context(|| format!("cannot write '{}'", path))?;
        w.flush()?;

        write_bincode(&format!("{}.sa", prefix), &self.samples)?;
        Ok(())
    }

    pub fn load(prefix: &str) -> Result<Self> {
        let path = format!("{}.bwt", prefix);
        let f = File::open(&path).with_context(|| format!("cannot open '{}'", path))?;
        let bwt = Bwt::read_from(&mut BufReader::new(f))
            .with_context(|| format!("cannot decode '{}'", path))?;
        let samples: SaSamples = read_bincode(&format!("{}.sa", prefix))?;

        let n = bwt.symbols.len();
        if n == 0 {
            bail!("index '{}' has an empty BWT", prefix);
        }
        if samples.density == 0 || samples.samples.len() != n.div_ceil(samples.density) {
            bail!(
                "index '{}' has {} SA samples at density {}, inconsistent with {} BWT symbols",
                prefix,
                samples.samples.len(),
                samples.density,
                n
            );
        }
        if bwt.primary >= n {
            bail!(
                "index '{}' has primary row {} outside the BWT",
                prefix,
                bwt.primary
            );
        }
        // 分隔符必须是最小的符号，且 primary 行的 BWT 字符就是回绕来的分隔符
        if bwt.symbols.alphabet().first() != Some(&bwt.sentinel) {
            bail!(
                "index '{}' has symbols sorting before the sentinel '{}'",
                prefix,
                bwt.sentinel as char
            );
        }
        if bwt.symbols.access(bwt.primary) != bwt.sentinel {
            bail!(
                "index '{}' has no sentinel at primary row {}",
                prefix,
                bwt.primary
            );
        }
        info!("index loaded: {} symbols from '{}'", n, prefix);
        Ok(Self::from_parts(bwt, samples))
    }
}

/// 后缀数组必须是 `0..n` 的一个排列
fn check_permutation(sa: &[usize]) -> Result<()> {
    let n = sa.len();
    let mut seen = RawVector::with_len(n, false);
    for (row, &p) in sa.iter().enumerate() {
        if p >= n {
            bail!(
                "suffix array entry {} is out of range for a stream of {} bytes",
                p,
                n
            );
        }
        if seen.bit(p) {
            bail!("suffix array repeats position {} at row {}", p, row);
        }
        seen.set_bit(p, true);
    }
    Ok(())
}

fn write_bincode<T: Serialize>(path: &str, value: &T) -> Result<()> {
    let f = File::create(path).with_context(|| format!("cannot create '{}'", path))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, value).with_context(|| format!("cannot write '{}'", path))?;
    w.flush()?;
    Ok(())
}

fn read_bincode<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("cannot open '{}'", path))?;
    bincode::deserialize_from(BufReader::new(f))
        .with_context(|| format!("cannot decode '{}'", path))
}
