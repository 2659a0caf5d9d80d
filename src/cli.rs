//! Command-line surface: argument parsing (`clap` derive) and the
//! resolution step that turns flags into a [`Policy`] and a
//! [`crate::build::BuildConfig`].

use std::path::PathBuf;

use clap::Parser;

use crate::build::BuildConfig;
use crate::config::{DEFAULT_FASTA_MARKER, DEFAULT_INDEX_SUFFIX, DEFAULT_MAX_ACCS, FASTQ_MARKER};
use crate::error::BuildError;
use crate::keys::stopwords::load_stopwords;
use crate::keys::{FieldSelector, JunkSet, Policy};

/// Builds a persistent CDB hash index over a FASTA or FASTQ sequence database.
#[derive(Parser, Debug)]
#[command(name = "cdbfasta", version, about)]
pub struct Cli {
    /// Input FASTA/FASTQ database file.
    pub input: PathBuf,

    /// Output index path. Defaults to `<database>.cidx`.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Record marker: literal bytes, `\NNN` octal, or `0xNN` hex (1..126 bytes decoded).
    #[arg(short = 'r', long = "marker")]
    pub marker: Option<String>,

    /// Compress the database into a companion LZ4-block file at this path.
    #[arg(short = 'z', long = "compress")]
    pub compress: Option<PathBuf>,

    /// Junk characters stripped from both ends of multi-key tokens.
    #[arg(short = 's', long = "strip")]
    pub strip: Option<String>,

    /// Stopword file: tokens filtered out of multi-key output.
    #[arg(short = 'w', long = "stopwords")]
    pub stopwords: Option<PathBuf>,

    /// Multi-key policy: every whitespace-separated token is a key.
    #[arg(short = 'm', long = "multi")]
    pub multi: bool,

    /// Multi-key policy restricted to the first N tokens, or (combined
    /// with `-a`/`-A`) the cap on bare accessions emitted per defline.
    #[arg(short = 'n', long = "num-keys")]
    pub num_keys: Option<u32>,

    /// Multi-key policy restricted to an explicit field list (e.g. "1,3,5-").
    #[arg(short = 'f', long = "fields")]
    pub fields: Option<String>,

    /// NCBI-style compact shortcut: first db|accession pair only.
    #[arg(short = 'c', long = "compact")]
    pub compact: bool,

    /// NCBI-style compact, repeated over every concatenated defline and pair.
    #[arg(short = 'C', long = "compact-plus")]
    pub compact_plus: bool,

    /// Also emit bare accessions (implies compact-plus).
    #[arg(short = 'a', long = "accession")]
    pub accession: bool,

    /// Emit only bare accessions, no db|accession or whole-token keys.
    #[arg(short = 'A', long = "accession-plus")]
    pub accession_plus: bool,

    /// Split the first token of each defline on a delimiter byte.
    #[arg(short = 'D', long = "key-delim")]
    pub key_delim: bool,

    /// The delimiter byte used by `-D` (defaults to `|`).
    #[arg(short = 'd', long = "key-delim-char")]
    pub key_delim_char: Option<char>,

    /// Additionally emit the lowercased form of every key that differs.
    #[arg(short = 'i', long = "case-insensitive")]
    pub case_insensitive: bool,

    /// Treat the input as FASTQ and validate seq/quality structure.
    #[arg(short = 'Q', long = "fastq")]
    pub fastq: bool,

    /// Validate uniform body-line lengths (large single/multi-line genomic FASTA).
    #[arg(short = 'G', long = "large-fasta")]
    pub large_fasta: bool,

    /// Raise the diagnostics display level; repeatable (-v, -vv).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Decodes a `-r/--marker` argument: literal bytes, `\NNN` octal escapes, or
/// `0xNN` hex escapes (each escape form exactly 4 source characters long),
/// mixed freely within one marker string.
fn parse_marker(spec: &str) -> Result<Vec<u8>, BuildError> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 3 < chars.len() && chars[i + 1].is_digit(8) {
            let octal: String = chars[i + 1..i + 4].iter().collect();
            let byte = u8::from_str_radix(&octal, 8)
                .map_err(|_| BuildError::config(format!("invalid octal escape in marker '{spec}'")))?;
            out.push(byte);
            i += 4;
        } else if chars[i] == '0' && i + 1 < chars.len() && (chars[i + 1] == 'x' || chars[i + 1] == 'X') && i + 3 < chars.len() {
            let hex: String = chars[i + 2..i + 4].iter().collect();
            let byte = u8::from_str_radix(&hex, 16)
                .map_err(|_| BuildError::config(format!("invalid hex escape in marker '{spec}'")))?;
            out.push(byte);
            i += 4;
        } else {
            let mut buf = [0u8; 4];
            out.extend_from_slice(chars[i].encode_utf8(&mut buf).as_bytes());
            i += 1;
        }
    }
    if out.is_empty() || out.len() > 126 {
        return Err(BuildError::config(format!(
            "marker must decode to 1..126 bytes, got {}",
            out.len()
        )));
    }
    Ok(out)
}

fn resolve_policy(cli: &Cli) -> Result<Policy, BuildError> {
    let exclusive = [
        cli.multi,
        cli.fields.is_some(),
        cli.compact,
        cli.compact_plus,
        cli.accession,
        cli.accession_plus,
        cli.key_delim,
    ];
    if exclusive.iter().filter(|&&f| f).count() > 1 {
        return Err(BuildError::config(
            "multi/fields/compact/compact-plus/accession/accession-plus/key-delim are mutually exclusive",
        ));
    }
    if cli.num_keys.is_some()
        && (cli.multi || cli.fields.is_some() || cli.compact || cli.compact_plus || cli.key_delim)
    {
        return Err(BuildError::config(
            "num-keys combines only with the default policy or accession/accession-plus",
        ));
    }

    if cli.key_delim {
        let delim = cli.key_delim_char.unwrap_or('|') as u32;
        if delim > 0xFF {
            return Err(BuildError::config("key-delim character must be a single byte"));
        }
        return Ok(Policy::KeyDelim(delim as u8));
    }

    if cli.compact || cli.compact_plus || cli.accession || cli.accession_plus {
        let plus = cli.compact_plus || cli.accession || cli.accession_plus;
        let acc_mode = cli.accession || cli.accession_plus;
        let acc_only = cli.accession;
        let max_accs = cli.num_keys.map(|n| n as usize).unwrap_or(DEFAULT_MAX_ACCS);
        return Ok(Policy::Compact {
            plus,
            acc_mode,
            acc_only,
            max_accs,
        });
    }

    if let Some(fields) = &cli.fields {
        return Ok(Policy::Multi(FieldSelector::parse(fields)?));
    }
    if let Some(n) = cli.num_keys {
        return Ok(Policy::Multi(FieldSelector::first_n(n)?));
    }
    if cli.multi {
        return Ok(Policy::Multi(FieldSelector::parse("1-")?));
    }

    Ok(Policy::Default)
}

impl Cli {
    /// Validates flag combinations and produces the fully-resolved build
    /// configuration the driver runs from.
    pub fn resolve(self) -> Result<BuildConfig, BuildError> {
        crate::diagnostics::set_display_level(1 + self.verbose.min(1) as u32);

        if self.fastq && self.compress.is_some() {
            return Err(BuildError::config(
                "FASTQ structural validation and database compression cannot be combined",
            ));
        }

        let policy = resolve_policy(&self)?;

        let marker: Vec<u8> = if self.fastq {
            FASTQ_MARKER.to_vec()
        } else if let Some(spec) = &self.marker {
            parse_marker(spec)?
        } else {
            DEFAULT_FASTA_MARKER.to_vec()
        };

        let junk = match &self.strip {
            Some(chars) => JunkSet::new(chars.as_bytes()),
            None => JunkSet::default(),
        };

        let stopwords = match &self.stopwords {
            Some(path) => {
                let file = std::fs::File::open(path).map_err(BuildError::IoRead)?;
                Some(load_stopwords(file)?)
            }
            None => None,
        };

        let output = self.output.clone().unwrap_or_else(|| {
            let mut name = self.input.clone().into_os_string();
            name.push(DEFAULT_INDEX_SUFFIX);
            PathBuf::from(name)
        });

        Ok(BuildConfig {
            input: self.input,
            output,
            compress: self.compress,
            policy,
            marker,
            stopwords,
            junk,
            case_insensitive: self.case_insensitive,
            fastq: self.fastq,
            large_fasta: self.large_fasta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_literal_marker() {
        assert_eq!(parse_marker(">").unwrap(), b">".to_vec());
    }

    #[test]
    fn decodes_octal_escape() {
        assert_eq!(parse_marker("\\076").unwrap(), vec![0o76]);
    }

    #[test]
    fn decodes_hex_escape() {
        assert_eq!(parse_marker("0x3E").unwrap(), vec![0x3E]);
    }

    #[test]
    fn rejects_empty_marker() {
        assert!(parse_marker("").is_err());
    }

    #[test]
    fn rejects_oversized_marker() {
        let spec = ">".repeat(200);
        assert!(parse_marker(&spec).is_err());
    }

    fn base_cli() -> Cli {
        Cli {
            input: PathBuf::from("db.fa"),
            output: None,
            marker: None,
            compress: None,
            strip: None,
            stopwords: None,
            multi: false,
            num_keys: None,
            fields: None,
            compact: false,
            compact_plus: false,
            accession: false,
            accession_plus: false,
            key_delim: false,
            key_delim_char: None,
            case_insensitive: false,
            fastq: false,
            large_fasta: false,
            verbose: 0,
        }
    }

    #[test]
    fn rejects_fastq_with_compress() {
        let mut cli = base_cli();
        cli.fastq = true;
        cli.compress = Some(PathBuf::from("db.lz4"));
        assert!(matches!(cli.resolve(), Err(BuildError::Config(_))));
    }

    #[test]
    fn defaults_output_to_cidx_suffix() {
        let cli = base_cli();
        let config = cli.resolve().unwrap();
        assert_eq!(config.output, PathBuf::from("db.fa.cidx"));
    }

    #[test]
    fn fastq_forces_at_sign_marker() {
        let mut cli = base_cli();
        cli.fastq = true;
        let config = cli.resolve().unwrap();
        assert_eq!(config.marker, b"@".to_vec());
    }

    #[test]
    fn rejects_conflicting_policy_flags() {
        let mut cli = base_cli();
        cli.multi = true;
        cli.compact = true;
        assert!(matches!(resolve_policy(&cli), Err(BuildError::Config(_))));
    }

    #[test]
    fn num_keys_combines_with_accession() {
        let mut cli = base_cli();
        cli.accession = true;
        cli.num_keys = Some(5);
        let policy = resolve_policy(&cli).unwrap();
        assert!(matches!(
            policy,
            Policy::Compact { acc_mode: true, max_accs: 5, .. }
        ));
    }

    #[test]
    fn num_keys_rejects_combination_with_multi() {
        let mut cli = base_cli();
        cli.multi = true;
        cli.num_keys = Some(5);
        assert!(matches!(resolve_policy(&cli), Err(BuildError::Config(_))));
    }

    #[test]
    fn accession_flag_sets_acc_only() {
        let mut cli = base_cli();
        cli.accession = true;
        let policy = resolve_policy(&cli).unwrap();
        assert!(matches!(
            policy,
            Policy::Compact { acc_only: true, acc_mode: true, .. }
        ));
    }

    #[test]
    fn accession_plus_flag_clears_acc_only() {
        let mut cli = base_cli();
        cli.accession_plus = true;
        let policy = resolve_policy(&cli).unwrap();
        assert!(matches!(
            policy,
            Policy::Compact { acc_only: false, acc_mode: true, .. }
        ));
    }
}
