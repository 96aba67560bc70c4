//! 把 FASTA / FASTQ 文件拼接成一条 `$` 分隔的流。

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::fasta::FastaReader;
use super::fastq::FastqReader;
use crate::index::SENTINEL;
use crate::util::dna;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Fasta,
    Fastq,
}

impl Format {
    /// 扩展名为 `fq` / `fastq`（不区分大小写）时按 FASTQ 解析，其余按 FASTA
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext.eq_ignore_ascii_case("fq") || ext.eq_ignore_ascii_case("fastq") {
            Format::Fastq
        } else {
            Format::Fasta
        }
    }
}

/// 逐条写入片段，每条后面跟一个分隔符
struct StreamWriter<W: Write> {
    out: W,
    len: usize,
    records: usize,
}

impl<W: Write> StreamWriter<W> {
    fn push(&mut self, seq: &[u8]) -> Result<()> {
        if seq.is_empty() {
            return Ok(());
        }
        self.out.write_all(&dna::normalize_seq(seq))?;
        self.out.write_all(&[SENTINEL])?;
        self.len += seq.len() + 1;
        self.records += 1;
        Ok(())
    }

    fn append_file(&mut self, path: &Path) -> Result<()> {
        let f = File::open(path)
            .with_context(|| format!("cannot open input '{}'", path.display()))?;
        let reader = BufReader::new(f);
        let before = self.records;
        let within = || format!("in '{}'", path.display());
        match Format::from_path(path) {
            Format::Fasta => {
                let mut r = FastaReader::new(reader);
                while let Some(rec) = r.next_record().with_context(within)? {
                    self.push(&rec.seq)?;
                }
            }
            Format::Fastq => {
                let mut r = FastqReader::new(reader);
                while let Some(rec) = r.next_record().with_context(within)? {
                    self.push(&rec.seq)?;
                }
            }
        }
        info!("{}: {} records", path.display(), self.records - before);
        Ok(())
    }
}

/// 将输入文件中的序列依次写入 `out`，返回流的字节数。
///
/// 序列经 [`dna::normalize_seq`] 归一化，分隔符不会出现在片段内部；
/// 空记录被跳过。所有输入都为空时写出单个分隔符。
pub fn concatenate<P: AsRef<Path>>(inputs: &[P], out: &Path) -> Result<usize> {
    let f = File::create(out)
        .with_context(|| format!("cannot create stream '{}'", out.display()))?;
    let mut w = StreamWriter {
        out: BufWriter::new(f),
        len: 0,
        records: 0,
    };
    for input in inputs {
        w.append_file(input.as_ref())?;
    }
    if w.records == 0 {
        w.out.write_all(&[SENTINEL])?;
        w.len = 1;
    }
    w.out.flush()?;
    info!(
        "stream '{}': {} records, {} bytes",
        out.display(),
        w.records,
        w.len
    );
    Ok(w.len)
}
