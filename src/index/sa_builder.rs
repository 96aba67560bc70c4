//! 后缀数组构建器：进程内倍增法，或调用外部批处理程序。

use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::{sa, sa5};

/// 由拼接流构建后缀数组。
///
/// `stream` 为流文件路径，`text` 为已读入内存的同一份内容；
/// 实现可按需使用其中之一，返回值长度必须等于 `text.len()`。
pub trait SuffixArrayBuilder {
    fn build(&self, stream: &Path, text: &[u8]) -> Result<Vec<usize>>;
}

/// 进程内倍增法
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixDoublingBuilder;

impl SuffixArrayBuilder for PrefixDoublingBuilder {
    fn build(&self, _stream: &Path, text: &[u8]) -> Result<Vec<usize>> {
        info!("building suffix array in process ({} bytes)", text.len());
        Ok(sa::build_sa(text))
    }
}

/// 外部构建器（pSAscan 兼容）：`<program> --output=<tmp>/stream.sa5 <stream>`。
///
/// 输出写在一个临时目录里，函数返回时（无论成功与否）目录连同 sa5 文件一起删除。
#[derive(Debug, Clone)]
pub struct ExternalBuilder {
    pub program: PathBuf,
}

impl ExternalBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SuffixArrayBuilder for ExternalBuilder {
    fn build(&self, stream: &Path, text: &[u8]) -> Result<Vec<usize>> {
        let workdir = tempfile::Builder::new()
            .prefix("wanda-sa")
            .tempdir()
            .context("cannot create temporary directory for suffix array construction")?;
        let output = workdir.path().join("stream.sa5");

        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--output={}", output.display())).arg(stream);
        info!("running external suffix array builder: {:?}", cmd);

        let status = cmd.status().with_context(|| {
            format!(
                "cannot run suffix array builder '{}'",
                self.program.display()
            )
        })?;
        if !status.success() {
            bail!(
                "suffix array builder '{}' failed: {}",
                self.program.display(),
                status
            );
        }

        let sa = sa5::read_sa5_file(&output)?;
        if sa.len() != text.len() {
            bail!(
                "suffix array builder produced {} entries for a stream of {} bytes",
                sa.len(),
                text.len()
            );
        }
        debug!("suffix array read from {}", output.display());
        Ok(sa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_doubling_ignores_the_path() {
        let sa = PrefixDoublingBuilder
            .build(Path::new("/nonexistent"), b"ACGTACGA$")
            .unwrap();
        assert_eq!(sa, vec![8, 7, 4, 0, 5, 1, 6, 2, 3]);
    }

    #[test]
    fn missing_external_program_is_an_error() {
        let builder = ExternalBuilder::new("/nonexistent/psascan");
        let err = builder.build(Path::new("stream.txt"), b"A$").unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("cannot run suffix array builder"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_external_program_is_an_error() {
        let builder = ExternalBuilder::new("false");
        let err = builder.build(Path::new("stream.txt"), b"A$").unwrap_err();
        assert!(err.to_string().contains("failed"));
    }

    #[cfg(unix)]
    #[test]
    fn external_program_output_is_read_and_cleaned_up() {
        use std::os::unix::fs::PermissionsExt;

        let text = b"GATTACA$CATTAG$";
        let expected = sa::build_sa(text);
        let dir = tempfile::tempdir().unwrap();
        let prepared = dir.path().join("prepared.sa5");
        sa5::write_sa5_file(&prepared, &expected).unwrap();

        // 把准备好的 sa5 复制到 --output 指定的位置，并记下这个位置
        let seen = dir.path().join("output-path");
        let script = dir.path().join("copy-sa5.sh");
        let body = format!(
            "#!/bin/sh\nout=\"${{1#--output=}}\"\ncp '{}' \"$out\"\nprintf '%s' \"$out\" > '{}'\n",
            prepared.display(),
            seen.display()
        );
        std::fs::write(&script, body).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let stream = dir.path().join("stream.txt");
        std::fs::write(&stream, text).unwrap();
        let sa = ExternalBuilder::new(script.clone())
            .build(&stream, text)
            .unwrap();
        assert_eq!(sa, expected);

        let output = PathBuf::from(std::fs::read_to_string(&seen).unwrap());
        assert_eq!(output.file_name().unwrap(), "stream.sa5");
        let workdir = output.parent().unwrap();
        let workdir_name = workdir.file_name().unwrap().to_string_lossy();
        assert!(workdir_name.starts_with("wanda-sa"));
        assert!(!output.exists());
        assert!(!workdir.exists());
    }
}
