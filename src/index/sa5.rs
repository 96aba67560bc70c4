//! 外部后缀数组构建器的输出格式：每个位置 5 字节小端整数。

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{BufReader, Read};
use std::path::Path;

/// 每个后缀位置占用的字节数
pub const SA5_WIDTH: usize = 5;

/// 读取 `count` 个 5 字节位置
pub fn read_sa5<R: Read>(mut reader: R, count: usize) -> Result<Vec<usize>> {
    let mut sa = Vec::with_capacity(count);
    for i in 0..count {
        let p = reader
            .read_uint::<LittleEndian>(SA5_WIDTH)
            .with_context(|| format!("truncated suffix array at entry {}", i))?;
        sa.push(p as usize);
    }
    Ok(sa)
}

/// 生成外部构建器格式的文件，仅测试使用
#[cfg(test)]
fn write_sa5<W: std::io::Write>(mut writer: W, sa: &[usize]) -> Result<()> {
    use byteorder::WriteBytesExt;

    for &p in sa {
        if (p as u64) >> (8 * SA5_WIDTH) != 0 {
            bail!("suffix position {} does not fit in {} bytes", p, SA5_WIDTH);
        }
        writer.write_uint::<LittleEndian>(p as u64, SA5_WIDTH)?;
    }
    writer.flush()?;
    Ok(())
}

/// 读取整个 sa5 文件，条目数由文件长度决定
pub fn read_sa5_file(path: &Path) -> Result<Vec<usize>> {
    let len = std::fs::metadata(path)
        .with_context(|| format!("cannot stat suffix array file '{}'", path.display()))?
        .len() as usize;
    if len % SA5_WIDTH != 0 {
        bail!(
            "suffix array file '{}' has length {}, not a multiple of {}",
            path.display(),
            len,
            SA5_WIDTH
        );
    }
    let f = std::fs::File::open(path)
        .with_context(|| format!("cannot open suffix array file '{}'", path.display()))?;
    read_sa5(BufReader::new(f), len / SA5_WIDTH)
}

#[cfg(test)]
pub(crate) fn write_sa5_file(path: &Path, sa: &[usize]) -> Result<()> {
    let f = std::fs::File::create(path)
        .with_context(|| format!("cannot create suffix array file '{}'", path.display()))?;
    write_sa5(std::io::BufWriter::new(f), sa)
}
