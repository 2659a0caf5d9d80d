//! End-to-end scenarios exercising the build driver against on-disk
//! FASTA/FASTQ files, covering the single-token, multi-key, NCBI
//! compact/accession, key-delim, large-FASTA, and FASTQ paths, plus the
//! narrow/wide payload boundary at 2^32.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};

use cdbfasta::build::{self, BuildConfig};
use cdbfasta::cdb::CdbWriter;
use cdbfasta::keys::{FieldSelector, JunkSet, Policy};
use cdbfasta::record::Payload;
use cdbfasta::trailer::Trailer;

fn write_db(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    File::create(&path).unwrap().write_all(contents).unwrap();
    path
}

fn base_config(input: std::path::PathBuf, output: std::path::PathBuf, policy: Policy) -> BuildConfig {
    BuildConfig {
        input,
        output,
        compress: None,
        policy,
        marker: b">".to_vec(),
        stopwords: None,
        junk: JunkSet::default(),
        case_insensitive: false,
        fastq: false,
        large_fasta: false,
    }
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

/// Minimal reference reader, duplicated from the writer's own unit tests:
/// enough to make the scenarios below self-checking without shipping a
/// production lookup path.
fn cdb_lookup(data: &[u8], key: &[u8]) -> Option<Vec<u8>> {
    use cdbfasta::cdb::CdbHash;

    let hash = CdbHash::new(key);
    let dir_off = hash.bucket() * 8;
    let table_offset = read_u32(data, dir_off) as usize;
    let num_slots = read_u32(data, dir_off + 4) as usize;
    if num_slots == 0 {
        return None;
    }
    let start = hash.start_slot(num_slots);
    for i in 0..num_slots {
        let slot = (start + i) % num_slots;
        let slot_off = table_offset + slot * 8;
        let slot_hash = read_u32(data, slot_off);
        let data_offset = read_u32(data, slot_off + 4);
        if slot_hash == 0 && data_offset == 0 {
            return None;
        }
        if slot_hash == hash.0 {
            let klen = read_u32(data, data_offset as usize) as usize;
            let plen = read_u32(data, data_offset as usize + 4) as usize;
            let kstart = data_offset as usize + 8;
            let vstart = kstart + klen;
            if &data[kstart..vstart] == key {
                return Some(data[vstart..vstart + plen].to_vec());
            }
        }
    }
    None
}

fn read_index(path: &std::path::Path) -> Vec<u8> {
    let mut buf = Vec::new();
    File::open(path).unwrap().read_to_end(&mut buf).unwrap();
    buf
}

#[test]
fn s1_default_single_key_fasta() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "s1.fa", b">seqA desc one\nACGTACGT\n>seqB desc two\nTTTTCCCC\n");
    let output = input.with_extension("cidx");

    let stats = build::run(&base_config(input.clone(), output.clone(), Policy::Default)).unwrap();
    assert_eq!(stats.num_records, 2);
    assert_eq!(stats.num_keys, 2);

    let data = read_index(&output);
    assert!(cdb_lookup(&data, b"seqA").is_some());
    assert!(cdb_lookup(&data, b"seqB").is_some());
    assert!(cdb_lookup(&data, b"desc").is_none());
}

#[test]
fn s2_multi_key_junk_stripping() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "s2.fa", b">(seqA) [replicate] final.\nACGT\n");
    let output = input.with_extension("cidx");

    let selector = FieldSelector::parse("1-").unwrap();
    let stats = build::run(&base_config(input, output.clone(), Policy::Multi(selector))).unwrap();
    assert_eq!(stats.num_records, 1);

    let data = read_index(&output);
    assert!(cdb_lookup(&data, b"seqA").is_some());
    assert!(cdb_lookup(&data, b"replicate").is_some());
    assert!(cdb_lookup(&data, b"final").is_some());
    assert!(cdb_lookup(&data, b"(seqA)").is_none());
}

#[test]
fn s3_compact_plus_accession_mode() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "s3.fa", b">gi|12345|ref|67890123| some protein\nMKV\n");
    let output = input.with_extension("cidx");

    let policy = Policy::Compact {
        plus: true,
        acc_mode: true,
        acc_only: false,
        max_accs: 255,
    };
    build::run(&base_config(input, output.clone(), policy)).unwrap();

    let data = read_index(&output);
    assert!(cdb_lookup(&data, b"gi|12345").is_some());
    assert!(cdb_lookup(&data, b"12345").is_some());
}

#[test]
fn s4_key_delim_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "s4.fa", b">gi|12345|ref description\nMKV\n");
    let output = input.with_extension("cidx");

    build::run(&base_config(input, output.clone(), Policy::KeyDelim(b'|'))).unwrap();

    let data = read_index(&output);
    assert!(cdb_lookup(&data, b"gi").is_some());
    assert!(cdb_lookup(&data, b"12345").is_some());
    assert!(cdb_lookup(&data, b"ref").is_some());
}

#[test]
fn s5_large_fasta_validation_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();

    let good = write_db(&dir, "s5_good.fa", b">chr1\nACGTACGT\nACGTACGT\nACGT\n");
    let mut config = base_config(good.clone(), good.with_extension("cidx"), Policy::Default);
    config.large_fasta = true;
    assert!(build::run(&config).is_ok());

    let bad = write_db(&dir, "s5_bad.fa", b">chr1\nACGTACGT\nACGT\nACGTACGT\n");
    let mut config = base_config(bad.clone(), bad.with_extension("cidx"), Policy::Default);
    config.large_fasta = true;
    assert!(build::run(&config).is_err());
}

#[test]
fn s6_fastq_success_and_failure() {
    let dir = tempfile::tempdir().unwrap();

    let good = write_db(&dir, "s6_good.fq", b"@read1\nACGTACGT\n+\nIIIIIIII\n");
    let mut config = base_config(good.clone(), good.with_extension("cidx"), Policy::Default);
    config.fastq = true;
    config.marker = b"@".to_vec();
    let stats = build::run(&config).unwrap();
    assert_eq!(stats.num_records, 1);

    let bad = write_db(&dir, "s6_bad.fq", b"@read1\nACGTACGT\n+\nIII\n");
    let mut config = base_config(bad.clone(), bad.with_extension("cidx"), Policy::Default);
    config.fastq = true;
    config.marker = b"@".to_vec();
    assert!(build::run(&config).is_err());
}

#[test]
fn stopword_filtering_suppresses_listed_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "stop.fa", b">seqA the thing\nACGT\n");
    let output = input.with_extension("cidx");

    let mut stop = HashSet::new();
    stop.insert(b"the".to_vec());

    let mut config = base_config(input, output.clone(), Policy::Multi(FieldSelector::parse("1-").unwrap()));
    config.stopwords = Some(stop);
    build::run(&config).unwrap();

    let data = read_index(&output);
    assert!(cdb_lookup(&data, b"the").is_none());
    assert!(cdb_lookup(&data, b"thing").is_some());
}

#[test]
fn boundary_offset_past_4gib_round_trips_through_cdb() {
    // Exercises the narrow/wide payload boundary directly against the CDB
    // writer rather than scanning an actual multi-gigabyte file.
    let mut writer = CdbWriter::new(std::io::Cursor::new(Vec::new())).unwrap();
    let past_4gib = (u32::MAX as u64) + 4096;
    writer.add(b"small", &Payload::new(17, 11).to_bytes()).unwrap();
    writer.add(b"huge", &Payload::new(past_4gib, 256).to_bytes()).unwrap();
    let cursor = writer.finish().unwrap();
    let data = cursor.into_inner();

    let small = cdb_lookup(&data, b"small").unwrap();
    assert_eq!(small.len(), 8);
    assert_eq!(Payload::from_bytes(&small), Some(Payload::new(17, 11)));

    let huge = cdb_lookup(&data, b"huge").unwrap();
    assert_eq!(huge.len(), 12);
    assert_eq!(Payload::from_bytes(&huge), Some(Payload::new(past_4gib, 256)));
}

#[test]
fn trailer_round_trips_basename_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_db(&dir, "trailer.fa", b">seqA\nACGT\n>seqB\nTTTT\n");
    let output = input.with_extension("cidx");

    build::run(&base_config(input.clone(), output.clone(), Policy::Default)).unwrap();

    let data = read_index(&output);
    let tail = &data[data.len() - ("trailer.fa".len() + cdbfasta::trailer::TRAILER_LEN)..];
    let trailer = Trailer::parse(tail).unwrap();
    assert_eq!(trailer.num_records, 2);
    assert_eq!(trailer.num_keys, 2);
    assert_eq!(trailer.dbname, b"trailer.fa".to_vec());
}
