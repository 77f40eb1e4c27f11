// 💾 Persistence Codec - one record per comma-delimited line
//
// Two layouts share the same framing (literal commas, no quoting, no header):
//
//   legacy:  <id>,<name>,<age>,<value>          staff and deposit kinds,
//                                               value with six decimals
//            <title>,<author>,<0|1>             borrowable kinds
//   tagged:  <tag>,<id>,<name>,<age>,<kind fields...>
//
// Legacy matches files written by earlier tools and is lossy on load:
// every 4-field line comes back as a Plain record. Tagged rebuilds the exact
// kind. A comma inside a name is NOT escaped; such a line fails to parse.

use csv::{QuoteStyle, WriterBuilder};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::catalog::{self, Variant};
use crate::entities::Record;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Legacy,
    #[default]
    Tagged,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Legacy => "legacy",
            Format::Tagged => "tagged",
        }
    }

    pub fn parse(name: &str) -> Option<Format> {
        match name.trim().to_lowercase().as_str() {
            "legacy" => Some(Format::Legacy),
            "tagged" => Some(Format::Tagged),
            _ => None,
        }
    }
}

/// Outcome of reading a file: what parsed, and why the rest did not
#[derive(Debug, Default)]
pub struct Decoded {
    pub records: Vec<Box<dyn Record>>,
    pub failures: Vec<ParseError>,
}

// ============================================================================
// ENCODE
// ============================================================================

/// Persisted fields of one record, in line order
pub fn encode_fields(record: &dyn Record, format: Format) -> Vec<String> {
    match format {
        Format::Tagged => {
            let mut fields = vec![
                record.variant().tag().to_string(),
                record.id().to_string(),
                record.name().to_string(),
                record.age().to_string(),
            ];
            fields.extend(record.fields());
            fields
        }
        Format::Legacy => match record.variant() {
            // fields() is author, flag
            Variant::Borrowable => {
                let mut fields = vec![record.name().to_string()];
                fields.extend(record.fields());
                fields
            }
            _ => vec![
                record.id().to_string(),
                record.name().to_string(),
                record.age().to_string(),
                format!("{:.6}", record.value()),
            ],
        },
    }
}

/// One record as a single line (no terminator)
pub fn encode(record: &dyn Record, format: Format) -> String {
    encode_fields(record, format).join(",")
}

/// Serialize records into newline-terminated lines
pub fn encode_all(records: &[Box<dyn Record>], format: Format) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    for record in records {
        writer.write_record(encode_fields(record.as_ref(), format))?;
    }

    writer.into_inner().map_err(|err| {
        let cause = err.error();
        csv::Error::from(io::Error::new(cause.kind(), cause.to_string()))
    })
}

/// SHA-256 fingerprint of a serialized snapshot
pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// DECODE
// ============================================================================

/// Rebuild a record from one persisted line
///
/// `line_no` is 1-based; legacy borrowable lines use it as their id.
pub fn decode_line(line: &str, line_no: usize, format: Format) -> Result<Box<dyn Record>, ParseError> {
    let fields: Vec<&str> = line.split(',').collect();
    decode_fields(&fields, line_no, format)
}

fn decode_fields(fields: &[&str], line_no: usize, format: Format) -> Result<Box<dyn Record>, ParseError> {
    match format {
        Format::Tagged => {
            let tag = fields.first().copied().unwrap_or("").trim();
            let variant = Variant::from_tag(tag).ok_or_else(|| ParseError::UnknownVariant {
                line: line_no,
                tag: tag.to_string(),
            })?;
            catalog::build(variant, &fields[1..], line_no)
        }
        Format::Legacy => match fields.len() {
            4 => catalog::build(Variant::Plain, fields, line_no),
            3 => {
                let id = line_no.to_string();
                let body = [id.as_str(), fields[0], "0", fields[1], fields[2]];
                catalog::build(Variant::Borrowable, &body, line_no)
            }
            found => Err(ParseError::FieldCount {
                line: line_no,
                expected: 4,
                found,
            }),
        },
    }
}

/// Read every line of `path`, keeping the ones that parse
///
/// Line numbers are physical and 1-based, blank lines included. Only an
/// unreadable file fails the whole call; a bad line is recorded in
/// `Decoded::failures` and reading continues with the next one.
pub fn read_records(path: &Path, format: Format) -> Result<Decoded, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let mut decoded = Decoded::default();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let line = match line {
            Ok(line) => line,
            Err(source) => {
                let fatal = source.kind() != io::ErrorKind::InvalidData;
                tracing::warn!(line = line_no, "skipping unreadable line: {}", source);
                decoded.failures.push(ParseError::Read {
                    line: line_no,
                    source,
                });
                if fatal {
                    break;
                }
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match decode_line(&line, line_no, format) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(line = line_no, "skipping malformed line: {}", err);
                decoded.failures.push(err);
            }
        }
    }

    Ok(decoded)
}
