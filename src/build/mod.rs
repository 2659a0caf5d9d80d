//! The build driver: wires the scanner, key extractor, CDB writer, optional
//! compressing sink, and trailer together into one index-building pass.

mod tee;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::cdb::CdbWriter;
use crate::compress::CompressingSink;
use crate::config::{COMPRESSED_TMP_SUFFIX, INDEX_TMP_SUFFIX, SCAN_BUF_SIZE};
use crate::displevel;
use crate::error::BuildError;
use crate::keys::{JunkSet, KeyExtractor, Policy};
use crate::record::{idx_flags, Payload};
use crate::scanner::{scan, ScanConfig};
use crate::trailer::Trailer;

use self::tee::TeeReader;

/// Fully-resolved configuration for one index build, produced by
/// [`crate::cli::Cli::resolve`].
pub struct BuildConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub compress: Option<PathBuf>,
    pub policy: Policy,
    pub marker: Vec<u8>,
    pub stopwords: Option<HashSet<Vec<u8>>>,
    pub junk: JunkSet,
    pub case_insensitive: bool,
    pub fastq: bool,
    pub large_fasta: bool,
}

/// Summary of a completed build, printed by the CLI entry point.
#[derive(Debug, Clone, Copy)]
pub struct BuildStats {
    pub num_records: u64,
    pub num_keys: u64,
    pub dbsize: u64,
}

fn idxflags_for(config: &BuildConfig) -> u32 {
    let mut flags = 0u32;
    match &config.policy {
        Policy::Multi(_) => flags |= idx_flags::MULTI,
        Policy::Compact { plus, .. } => {
            flags |= if *plus {
                idx_flags::COMPACT_PLUS
            } else {
                idx_flags::COMPACT
            };
        }
        Policy::Default | Policy::KeyDelim(_) => {}
    }
    if config.compress.is_some() {
        flags |= idx_flags::COMPRESS;
    }
    if config.large_fasta {
        flags |= idx_flags::LARGE_FASTA;
    }
    flags
}

fn tmp_path(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn atomic_replace(tmp: &Path, dest: &Path) -> Result<(), BuildError> {
    if dest.exists() {
        std::fs::remove_file(dest).map_err(BuildError::IoWrite)?;
    }
    std::fs::rename(tmp, dest).map_err(BuildError::IoWrite)
}

/// Runs one complete build: scans `config.input`, extracts keys per
/// `config.policy`, writes the CDB index (and, if configured, the
/// compressed companion database), and atomically installs both at their
/// final paths.
pub fn run(config: &BuildConfig) -> Result<BuildStats, BuildError> {
    let started = std::time::Instant::now();
    let input = File::open(&config.input).map_err(BuildError::IoRead)?;
    let reader = BufReader::with_capacity(SCAN_BUF_SIZE, input);

    let scan_config = ScanConfig {
        marker: &config.marker,
        fastq: config.fastq,
        large_fasta: config.large_fasta,
    };

    let index_tmp = tmp_path(&config.output, INDEX_TMP_SUFFIX);
    let mut writer = CdbWriter::create(&index_tmp)?;
    let mut extractor = KeyExtractor::new(
        config.policy.clone(),
        config.junk.clone(),
        config.stopwords.clone(),
        config.case_insensitive,
    );

    let dbsize = if let Some(compressed_path) = &config.compress {
        let compressed_tmp = tmp_path(compressed_path, COMPRESSED_TMP_SUFFIX);
        let sink_file = File::create(&compressed_tmp).map_err(BuildError::IoWrite)?;
        let mut sink = CompressingSink::new(sink_file);
        let mut tee = TeeReader::new(reader);
        let handle = tee.handle();

        scan(&mut tee, &scan_config, |record| {
            let raw = handle.slice_to_vec(record.offset, record.length);
            let (frame_offset, frame_len) = sink.write_record(&raw)?;
            extractor.extract(&record.header, frame_offset, frame_len, |key, off, len| {
                writer.add(key, &Payload::new(off, len).to_bytes())
            })?;
            handle.drain_through(record.offset, record.length);
            Ok(())
        })?;

        sink.finish()?;
        let size = std::fs::metadata(&compressed_tmp)
            .map_err(BuildError::IoWrite)?
            .len();
        atomic_replace(&compressed_tmp, compressed_path)?;
        size
    } else {
        let mut reader = reader;
        scan(&mut reader, &scan_config, |record| {
            extractor.extract(&record.header, record.offset, record.length, |key, off, len| {
                writer.add(key, &Payload::new(off, len).to_bytes())
            })
        })?
    };

    let num_keys = writer.num_keys() as u64;
    let num_records = extractor.num_records();

    let mut file = writer.finish()?;

    let trailer = Trailer {
        idxflags: idxflags_for(config),
        num_records: num_records as u32,
        num_keys: num_keys as u32,
        dbsize,
        dbname: Trailer::basename_of(&config.input),
    };
    {
        use std::io::Write;
        file.write_all(&trailer.to_bytes()).map_err(BuildError::IoWrite)?;
        file.flush().map_err(BuildError::IoWrite)?;
    }
    drop(file);

    atomic_replace(&index_tmp, &config.output)?;

    displevel!(
        1,
        "records: {num_records}  keys: {num_keys}  database bytes: {dbsize}  elapsed: {:.2?}",
        started.elapsed()
    );

    Ok(BuildStats {
        num_records,
        num_keys,
        dbsize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn write_tmp(name: &str, contents: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cdbfasta_build_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    #[test]
    fn builds_plain_index_with_trailer() {
        let input = write_tmp("db1.fa", b">seqA desc\nACGTACGT\n>seqB other\nTTTT\n");
        let output = input.with_extension("cidx");

        let config = BuildConfig {
            input: input.clone(),
            output: output.clone(),
            compress: None,
            policy: Policy::Default,
            marker: b">".to_vec(),
            stopwords: None,
            junk: JunkSet::default(),
            case_insensitive: false,
            fastq: false,
            large_fasta: false,
        };

        let stats = run(&config).unwrap();
        assert_eq!(stats.num_records, 2);
        assert_eq!(stats.num_keys, 2);

        let mut bytes = Vec::new();
        File::open(&output).unwrap().read_to_end(&mut bytes).unwrap();
        let tail = &bytes[bytes.len() - (b"db1.fa".len() + crate::trailer::TRAILER_LEN)..];
        let trailer = Trailer::parse(tail).unwrap();
        assert_eq!(trailer.num_records, 2);
        assert_eq!(trailer.num_keys, 2);
        assert_eq!(trailer.dbname, b"db1.fa".to_vec());

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn builds_compressed_index_with_compress_flag() {
        let input = write_tmp("db2.fa", b">seqA desc\nACGTACGTACGTACGTACGTACGTACGT\n>seqB other\nTTTT\n");
        let output = input.with_extension("cidx");
        let compressed = input.with_extension("cz");

        let config = BuildConfig {
            input: input.clone(),
            output: output.clone(),
            compress: Some(compressed.clone()),
            policy: Policy::Default,
            marker: b">".to_vec(),
            stopwords: None,
            junk: JunkSet::default(),
            case_insensitive: false,
            fastq: false,
            large_fasta: false,
        };

        let stats = run(&config).unwrap();
        assert_eq!(stats.num_records, 2);
        assert!(compressed.exists());

        let mut bytes = Vec::new();
        File::open(&output).unwrap().read_to_end(&mut bytes).unwrap();
        let tail = &bytes[bytes.len() - (b"db2.fa".len() + crate::trailer::TRAILER_LEN)..];
        let trailer = Trailer::parse(tail).unwrap();
        assert_ne!(trailer.idxflags & idx_flags::COMPRESS, 0);

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
        std::fs::remove_file(&compressed).ok();
    }
}
