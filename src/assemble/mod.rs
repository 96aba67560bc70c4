pub mod unitig;

use anyhow::{bail, Context, Result};
use log::info;
use std::io::Write;

use crate::graph::Graph;

pub use unitig::{assemble, Unitig};

/// unitig 组装参数
#[derive(Debug, Clone, Copy)]
pub struct AssembleOpt {
    /// 节点（及其邻居）的最小出现次数
    pub solid: usize,
    /// 输出 unitig 的最小长度
    pub min_length: usize,
    pub threads: usize,
}

impl Default for AssembleOpt {
    fn default() -> Self {
        Self {
            solid: 2,
            min_length: 0,
            threads: 1,
        }
    }
}

/// 以 FASTA 输出，标题按输出顺序编号为 `>contig0`、`>contig1`……
pub fn write_fasta<W: Write>(unitigs: &[Unitig], out: &mut W) -> Result<()> {
    for (i, u) in unitigs.iter().enumerate() {
        writeln!(out, ">contig{}", i)?;
        out.write_all(&u.seq)?;
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// 载入 `prefix` 下的图并输出 unitig；`expected_k` 给出时须与索引中的 k 一致。
pub fn run_assemble(
    prefix: &str,
    expected_k: Option<usize>,
    opt: AssembleOpt,
    out_path: Option<&str>,
) -> Result<()> {
    let graph = Graph::load(prefix).with_context(|| format!("cannot load graph '{}'", prefix))?;
    if let Some(k) = expected_k {
        if k != graph.k() {
            bail!(
                "graph '{}' was built with k={}, but k={} was requested",
                prefix,
                graph.k(),
                k
            );
        }
    }
    if let Some(src) = &graph.meta().stream_file {
        info!("graph built from '{}'", src);
    }

    let unitigs = assemble(&graph, &opt)?;

    let mut out: Box<dyn Write> = if let Some(p) = out_path {
        let f = std::fs::File::create(p).with_context(|| format!("cannot create output '{}'", p))?;
        Box::new(std::io::BufWriter::new(f))
    } else {
        Box::new(std::io::BufWriter::new(std::io::stdout()))
    };
    write_fasta(&unitigs, &mut out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::sa::build_sa;
    use crate::index::IndexConfig;

    fn store_small_graph(prefix: &str) {
        let text = b"ACGTACGA$";
        let sa = build_sa(text);
        Graph::from_text(text, &sa, 3, IndexConfig::default())
            .unwrap()
            .store(prefix)
            .unwrap();
    }

    fn unitig(seq: &[u8]) -> Unitig {
        Unitig {
            path: Vec::new(),
            seq: seq.to_vec(),
        }
    }

    #[test]
    fn fasta_headers_are_numbered_in_order() {
        let unitigs = vec![unitig(b"CGTACG"), unitig(b"CGA")];
        let mut buf = Vec::new();
        write_fasta(&unitigs, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            ">contig0\nCGTACG\n>contig1\nCGA\n"
        );
    }

    #[test]
    fn run_assemble_writes_fasta_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("idx");
        let prefix = prefix.to_str().unwrap();
        store_small_graph(prefix);

        let out = dir.path().join("unitigs.fa");
        let opt = AssembleOpt {
            solid: 0,
            min_length: 3,
            threads: 1,
        };
        run_assemble(prefix, Some(3), opt, out.to_str()).unwrap();

        let fasta = std::fs::read_to_string(&out).unwrap();
        let mut seqs: Vec<&str> = fasta.lines().filter(|l| !l.starts_with('>')).collect();
        seqs.sort_unstable();
        assert_eq!(seqs, vec!["CGA", "CGTACG"]);
        assert!(fasta.starts_with(">contig0\n"));
    }

    #[test]
    fn mismatched_k_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("idx");
        let prefix = prefix.to_str().unwrap();
        store_small_graph(prefix);

        let err = run_assemble(prefix, Some(4), AssembleOpt::default(), None).unwrap_err();
        assert!(err.to_string().contains("k=3"));
    }
}
