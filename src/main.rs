use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use wanda::assemble::{self, AssembleOpt};
use wanda::build::{self, BuildOpt};
use wanda::index::SA_SAMPLE_DENSITY;
use wanda::io::stream;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(
    name = "wanda",
    author,
    version,
    about = "Unitig assembly over an FM-index backed k-mer graph",
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); diagnostics go to stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Concatenate FASTA/FASTQ files into a '$'-separated stream
    Concat {
        /// Output stream file
        out: PathBuf,
        /// Input files (FASTQ when the extension is .fq or .fastq)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Build the self-index and k-mer graph of a stream
    Build {
        /// Stream file ending with '$'
        stream: PathBuf,
        /// k-mer length
        k: usize,
        /// Output prefix (<prefix>.bwt, <prefix>.sa, <prefix>.first)
        prefix: String,
        /// External suffix array builder writing 5-byte positions
        #[arg(long = "sa-builder")]
        sa_builder: Option<PathBuf>,
        /// Keep one suffix array sample every N rows
        #[arg(long = "sample-density", default_value_t = SA_SAMPLE_DENSITY)]
        sample_density: usize,
    },
    /// Compute unitigs and write them as FASTA
    Assemble {
        /// Index prefix given to `build`
        prefix: String,
        /// Minimum k-mer frequency
        solid: usize,
        /// Minimum unitig length
        min_length: usize,
        /// Expected k; fails if the index was built with another k
        #[arg(short)]
        k: Option<usize>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Output FASTA path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Commands::Concat { out, inputs } => run_concat(&out, &inputs),
        Commands::Build {
            stream,
            k,
            prefix,
            sa_builder,
            sample_density,
        } => {
            let opt = BuildOpt {
                sa_builder,
                sample_density,
            };
            build::run_build(&stream, k, &prefix, &opt)?;
            log::info!("index written under prefix '{}'", prefix);
            Ok(())
        }
        Commands::Assemble {
            prefix,
            solid,
            min_length,
            k,
            threads,
            out,
        } => {
            let opt = AssembleOpt {
                solid,
                min_length,
                threads,
            };
            assemble::run_assemble(&prefix, k, opt, out.as_deref())
        }
    }
}

fn run_concat(out: &Path, inputs: &[PathBuf]) -> Result<()> {
    let len = stream::concatenate(inputs, out)?;
    log::info!("wrote {} bytes to '{}'", len, out.display());
    Ok(())
}
