//! 序列输入：FASTA / FASTQ 解析与流拼接。

pub mod fasta;
pub mod fastq;
pub mod stream;
