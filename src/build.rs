use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::graph::{Graph, IndexMeta};
use crate::index::lcp::build_lcp;
use crate::index::sa_builder::{ExternalBuilder, PrefixDoublingBuilder, SuffixArrayBuilder};
use crate::index::{IndexConfig, SelfIndex, SA_SAMPLE_DENSITY, SENTINEL};

/// 索引构建参数
#[derive(Debug, Clone)]
pub struct BuildOpt {
    /// 外部后缀数组构建程序；为 None 时在进程内构建
    pub sa_builder: Option<PathBuf>,
    pub sample_density: usize,
}

impl Default for BuildOpt {
    fn default() -> Self {
        Self {
            sa_builder: None,
            sample_density: SA_SAMPLE_DENSITY,
        }
    }
}

/// 读入流，构建自索引与 k-mer 图并写出到 `prefix`。
///
/// 后缀数组与 LCP 只在构建期间存在，写出前即被释放。
pub fn run_build(stream: &Path, k: usize, prefix: &str, opt: &BuildOpt) -> Result<Graph> {
    let text = std::fs::read(stream)
        .with_context(|| format!("cannot read stream '{}'", stream.display()))?;
    info!("stream '{}': {} bytes", stream.display(), text.len());

    let builder: Box<dyn SuffixArrayBuilder> = match &opt.sa_builder {
        Some(program) => Box::new(ExternalBuilder::new(program.clone())),
        None => Box::new(PrefixDoublingBuilder),
    };
    let sa = builder.build(stream, &text)?;

    let config = IndexConfig {
        sentinel: SENTINEL,
        sample_density: opt.sample_density,
    };
    let index = SelfIndex::build(&text, &sa, config).context("cannot build the self-index")?;
    let lcp = build_lcp(&text, &sa);
    drop(sa);
    drop(text);

    let mut graph = Graph::build(Arc::new(index), k, &lcp)?;
    drop(lcp);

    graph.set_meta(IndexMeta {
        stream_file: Some(stream.display().to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    graph
        .store(prefix)
        .with_context(|| format!("cannot write index '{}'", prefix))?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let stream = dir.path().join("stream.txt");
        std::fs::write(&stream, b"ACGTACGA$").unwrap();
        let prefix = dir.path().join("idx");
        let prefix = prefix.to_str().unwrap();

        let opt = BuildOpt {
            sample_density: 4,
            ..Default::default()
        };
        let built = run_build(&stream, 3, prefix, &opt).unwrap();
        assert_eq!(built.node_count(), 8);

        let loaded = Graph::load(prefix).unwrap();
        assert_eq!(loaded.k(), 3);
        assert_eq!(loaded.index().sample_density(), 4);
        assert_eq!(loaded.meta().stream_file.as_deref(), stream.to_str());
        assert!(loaded.meta().build_timestamp.is_some());
        assert_eq!(loaded.distinct_kmers(0), built.distinct_kmers(0));
    }

    #[test]
    fn stream_without_final_sentinel_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let stream = dir.path().join("stream.txt");
        std::fs::write(&stream, b"ACGT").unwrap();
        let prefix = dir.path().join("idx");
        let prefix = prefix.to_str().unwrap();
        let err = run_build(&stream, 3, prefix, &BuildOpt::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("sentinel"));
        assert!(!dir.path().join("idx.first").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_external_builder_aborts_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let stream = dir.path().join("stream.txt");
        std::fs::write(&stream, b"ACGT$").unwrap();
        let prefix = dir.path().join("idx");
        let prefix = prefix.to_str().unwrap();
        let opt = BuildOpt {
            sa_builder: Some(PathBuf::from("false")),
            ..Default::default()
        };
        assert!(run_build(&stream, 2, prefix, &opt).is_err());
    }
}
