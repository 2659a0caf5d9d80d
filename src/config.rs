//! Compile-time configuration constants for the index builder.

/// Initial capacity of the growable header accumulator buffer.
pub const HEADER_BUF_INITIAL: usize = 16 * 1024;

/// Sanity cap on header-buffer growth; headers larger than this fail the
/// build with `BuildError::Format` rather than growing without bound.
pub const HEADER_BUF_MAX: usize = 16 * 1024 * 1024;

/// Size of the buffered reader used by the scanner.
pub const SCAN_BUF_SIZE: usize = 64 * 1024;

/// Maximum key length (bytes), inclusive of the implicit NUL terminator
/// budget. Keys of this length or longer are rejected with `KeyOverflow`.
pub const MAX_KEYLEN: usize = 1024;

/// Maximum number of explicit field-selector entries (`-f` option).
pub const MAX_FIELDS: usize = 254;

/// Default cap on the number of bare accessions collected per defline in
/// accession mode, unless overridden by `-n`.
pub const DEFAULT_MAX_ACCS: usize = 255;

/// Default junk-character set stripped from both ends of whitespace tokens
/// by the multi-key policies, unless overridden by `-s`.
pub const DEFAULT_JUNK_CHARS: &[u8] = b"'\",`.(){}/[]!:;~|><+-";

/// Default record marker for FASTA input.
pub const DEFAULT_FASTA_MARKER: &[u8] = b">";

/// Fixed record marker for FASTQ input.
pub const FASTQ_MARKER: &[u8] = b"@";

/// Index filename suffix appended to the database name when `-o` is omitted.
pub const DEFAULT_INDEX_SUFFIX: &str = ".cidx";

/// Deterministic temporary-file suffix for the index under construction.
pub const INDEX_TMP_SUFFIX: &str = "_tmp";

/// Deterministic temporary-file suffix for the compressed database under
/// construction.
pub const COMPRESSED_TMP_SUFFIX: &str = "_ztmp";
