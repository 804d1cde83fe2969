mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use eventnorm::{output, DateErrorPolicy, NormalizeError, Pipeline, RunSummary, Schema};
use memchr::memchr_iter;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in vendor schema (proofpoint, proofpoint-v1)
    #[arg(short, long, default_value = "proofpoint")]
    preset: String,

    /// JSON schema file, used instead of --preset
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// `stdout`, or a .csv / .tsv path
    #[arg(short, long, default_value = "stdout")]
    output: String,

    #[arg(long, value_enum, default_value_t = DateErrorPolicy::Fail)]
    on_date_error: DateErrorPolicy,

    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Export to normalize, `-` for stdin
    #[arg(value_name = "FILE")]
    file: String,

    #[arg(long)]
    benchmark: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            let code = err
                .downcast_ref::<NormalizeError>()
                .map(NormalizeError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let start_time = Instant::now();

    let schema = match &args.schema {
        Some(path) => Schema::from_path(path)
            .with_context(|| format!("loading schema {}", path.display()))?,
        None => eventnorm::schemas::lookup(&args.preset)?,
    };
    let pipeline = Pipeline::new(schema, args.on_date_error);

    let input = Input::open(&args.file)?;
    let bytes = input.as_bytes();
    let (records, summary) = pipeline.normalize_with_hint(bytes, bytes.len())?;

    // Output is only opened once the whole export normalized cleanly.
    let mut writer = output::create_writer(&args.output)?;
    writer.write_batch(&records)?;
    writer.finish()?;

    if args.benchmark {
        let total_lines = memchr_iter(b'\n', bytes).count();
        print_benchmark_results(bytes.len() as u64, total_lines, &summary, start_time.elapsed());
    }

    Ok(())
}

enum Input {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl Input {
    fn open(path: &str) -> Result<Self> {
        if path == "-" {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            return Ok(Input::Buffered(buf));
        }
        let file = File::open(path).with_context(|| format!("opening {path}"))?;
        if file.metadata()?.len() == 0 {
            return Ok(Input::Buffered(Vec::new()));
        }
        // The export is treated as read-only for the lifetime of the map.
        let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mapping {path}"))?;
        Ok(Input::Mapped(mmap))
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Input::Mapped(mmap) => mmap,
            Input::Buffered(buf) => buf,
        }
    }
}

fn print_benchmark_results(
    file_size: u64,
    total_lines: usize,
    summary: &RunSummary,
    duration: std::time::Duration,
) {
    let duration_secs = duration.as_secs_f64();
    let file_size_mb = file_size as f64 / (1024.0 * 1024.0);
    let throughput_mbs = file_size_mb / duration_secs;
    let throughput_lines = total_lines as f64 / duration_secs;

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("File size: {:.2} MB", file_size_mb);
    eprintln!("Total lines: {}", total_lines);
    eprintln!("Rows loaded: {}", summary.loaded);
    eprintln!("Rows kept by filter: {}", summary.filtered);
    eprintln!("Records written: {}", summary.records);
    eprintln!("Dates nulled: {}", summary.nulled_dates);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!("Throughput: {:.2} MB/s", throughput_mbs);
    eprintln!("Throughput: {:.0} lines/s", throughput_lines);
}
