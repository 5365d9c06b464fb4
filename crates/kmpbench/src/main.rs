//! Benchmark driver: streams a file through [`pagecache`] in multi-megabyte
//! chunks, running a KMP substring search over each chunk, and reports
//! elapsed time. A consumer of the cache, not part of it.

mod kmp;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use common::{CacheConfig, CacheResult};
use pagecache::{Cache, Fd, Whence};

const CHUNK_SIZE: usize = 4 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(about = "Search a file for a substring, streamed through the page cache")]
struct Args {
    /// File to scan.
    filename: PathBuf,
    /// Substring to search for.
    pattern: String,
    /// Number of full-file passes to run.
    repeat: u32,
}

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            use clap::error::ErrorKind;
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                err.exit();
            }
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if args.pattern.is_empty() {
        eprintln!("error: pattern must not be empty");
        std::process::exit(1);
    }

    if let Err(err) = run(&args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> CacheResult<()> {
    let started = Instant::now();

    let cache = Cache::new(CacheConfig::default());
    let fd = cache.open(&args.filename)?;

    let file_size = cache.seek(fd, 0, Whence::End)?;

    for pass in 0..args.repeat {
        log::debug!("starting pass {pass} over {file_size} bytes");
        cache.seek(fd, 0, Whence::Set)?;
        scan_once(&cache, fd, args.pattern.as_bytes(), file_size)?;
    }

    cache.close(fd)?;
    println!("Duration: {:.2} seconds", started.elapsed().as_secs_f64());
    Ok(())
}

fn scan_once(cache: &Cache, fd: Fd, pattern: &[u8], file_size: u64) -> CacheResult<()> {
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut consumed = 0u64;

    while consumed < file_size {
        let want = (file_size - consumed).min(CHUNK_SIZE as u64) as usize;
        cache.read(fd, &mut chunk[..want])?;
        for offset in kmp::find_matches(pattern, &chunk[..want], consumed) {
            println!("Found a match at: {offset}");
        }
        consumed += want as u64;
    }
    Ok(())
}
