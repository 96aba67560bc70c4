use anyhow::{bail, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastqRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// 四行一条的 FASTQ 解析器；记录之间的空行被跳过，质量行只校验长度。
pub struct FastqReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
        }
    }

    /// 读一行并去掉行尾换行；文件结束时返回 false
    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        if self.reader.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_no += 1;
        while matches!(self.line.last(), Some(b'\n' | b'\r')) {
            self.line.pop();
        }
        Ok(true)
    }

    fn expect_line(&mut self, what: &str) -> Result<()> {
        if !self.read_line()? {
            bail!(
                "FASTQ line {}: unexpected end of file, missing {}",
                self.line_no + 1,
                what
            );
        }
        Ok(())
    }

    pub fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        loop {
            if !self.read_line()? {
                return Ok(None);
            }
            if !self.line.is_empty() {
                break;
            }
        }
        if self.line[0] != b'@' {
            bail!(
                "FASTQ line {}: header does not start with '@'",
                self.line_no
            );
        }
        let id = String::from_utf8_lossy(&self.line[1..])
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();

        self.expect_line("sequence")?;
        let seq = std::mem::take(&mut self.line);

        self.expect_line("'+' separator")?;
        if !self.line.starts_with(b"+") {
            bail!("FASTQ line {}: expected '+' separator", self.line_no);
        }

        self.expect_line("quality")?;
        if self.line.len() != seq.len() {
            bail!(
                "FASTQ line {}: quality length {} does not match sequence length {}",
                self.line_no,
                self.line.len(),
                seq.len()
            );
        }

        Ok(Some(FastqRecord { id, seq }))
    }
}
