//! `<prefix>.first`：小端 u64 的 k，simple_sds 序列化的边界稀疏向量，
//! 最后是 bincode 编码的构建元信息。

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::info;
use serde::{Deserialize, Serialize};
use simple_sds::ops::BitVec;
use simple_sds::serialize::Serialize as _;
use simple_sds::sparse_vector::SparseVector;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::sync::Arc;

use super::Graph;
use crate::index::SelfIndex;

/// 索引构建元信息（来源流、命令行参数、构建时间）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub stream_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

fn first_path(prefix: &str) -> String {
    format!("{}.first", prefix)
}

impl Graph {
    /// 写出 `<prefix>.bwt`、`<prefix>.sa`、`<prefix>.first` 三个文件
    pub fn store(&self, prefix: &str) -> Result<()> {
        self.index.store(prefix)?;

        let path = first_path(prefix);
        let f = File::create(&path).with_context(|| format!("cannot create '{}'", path))?;
        let mut w = BufWriter::new(f);
        w.write_u64::<LittleEndian>(self.k as u64)?;
        self.first
            .serialize(&mut w)
            .with_context(|| format!("cannot write '{}'", path))?;
        bincode::serialize_into(&mut w, &self.meta)
            .with_context(|| format!("cannot write '{}'", path))?;
        w.flush()?;
        info!("graph stored under prefix '{}'", prefix);
        Ok(())
    }

    pub fn load(prefix: &str) -> Result<Self> {
        let index = Arc::new(SelfIndex::load(prefix)?);

        let path = first_path(prefix);
        let f = File::open(&path).with_context(|| format!("cannot open '{}'", path))?;
        let mut r = BufReader::new(f);
        let k = r
            .read_u64::<LittleEndian>()
            .with_context(|| format!("'{}' is missing its k header", path))? as usize;
        let first = SparseVector::load(&mut r)
            .with_context(|| format!("cannot decode the boundary vector in '{}'", path))?;
        let meta: IndexMeta = bincode::deserialize_from(&mut r)
            .with_context(|| format!("cannot decode '{}'", path))?;
        if first.len() != index.size() {
            bail!(
                "'{}' describes {} rows but the index under '{}' has {}",
                path,
                first.len(),
                prefix,
                index.size()
            );
        }
        Self::new(k, index, first, meta)
    }
}
