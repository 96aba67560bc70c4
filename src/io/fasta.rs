use anyhow::{bail, Result};
use std::io::BufRead;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub seq: Vec<u8>,
}

/// 按字节读取的 FASTA 解析器：多行序列拼接，行内空白与换行（含 CRLF）被丢弃。
/// 序列字节原样保留，归一化由调用方负责。
pub struct FastaReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_no: usize,
    done: bool,
    pending_id: Option<String>,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            line_no: 0,
            done: false,
            pending_id: None,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        let n = self.reader.read_until(b'\n', &mut self.line)?;
        if n == 0 {
            self.done = true;
            return Ok(false);
        }
        self.line_no += 1;
        Ok(true)
    }

    fn header_id(line: &[u8]) -> String {
        let header = String::from_utf8_lossy(&line[1..]);
        header.split_whitespace().next().unwrap_or("").to_string()
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        let id = match self.pending_id.take() {
            Some(id) => id,
            None => loop {
                if self.done || !self.read_line()? {
                    return Ok(None);
                }
                if self.line.starts_with(b">") {
                    break Self::header_id(&self.line);
                }
                if self.line.iter().any(|b| !b.is_ascii_whitespace()) {
                    bail!(
                        "FASTA line {}: sequence data before the first '>' header",
                        self.line_no
                    );
                }
            },
        };

        let mut seq = Vec::new();
        while self.read_line()? {
            if self.line.starts_with(b">") {
                self.pending_id = Some(Self::header_id(&self.line));
                break;
            }
            let bases = self.line.iter().copied();
            seq.extend(bases.filter(|b| !b.is_ascii_whitespace()));
        }

        Ok(Some(FastaRecord { id, seq }))
    }
}
