//! SAS XPORT (transport) record codec.
//!
//! Implements the V5 record layout: 80-byte card-image records, a fixed
//! sequence of library/member header records, 140-byte big-endian NAMESTR
//! entries, then fixed-width observation data padded to a record boundary.
//! The reader accepts both character and numeric variables (numeric values
//! are IBM mainframe doubles, decoded and stringified); the writer emits
//! every variable as character data, which is how the whole-table
//! stringification policy survives a round-trip.

use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::Utc;

use crate::error::{Error, Result};
use crate::table::Table;

const RECORD_LEN: usize = 80;
const NAMESTR_LEN: usize = 140;
// V5 caps character variables at 200 bytes
const MAX_FIELD_LEN: usize = 200;
// Offset of the npos field inside a NAMESTR entry
const NPOS_OFFSET: usize = 84;
// Header records preceding the NAMESTR block
const HEADER_RECORDS: usize = 8;

pub(crate) const DEFAULT_MEMBER_NAME: &str = "DATASET";

/// One 80-byte "HEADER RECORD" card with an 8-char keyword and a 30-digit
/// data field.
fn header_record(keyword: &str, data: &str) -> String {
    format!("HEADER RECORD*******{keyword:<8}HEADER RECORD!!!!!!!{data:<32}")
}

fn header_prefix(keyword: &str) -> String {
    format!("HEADER RECORD*******{keyword}")
}

fn push_record(out: &mut Vec<u8>, record: &str) {
    debug_assert_eq!(record.len(), RECORD_LEN);
    out.extend_from_slice(record.as_bytes());
}

/// Truncate/pad `text` to exactly `len` bytes, space-filled on the right.
fn fixed_field(text: &str, len: usize) -> Vec<u8> {
    let mut bytes: Vec<u8> = text.bytes().take(len).collect();
    bytes.resize(len, b' ');
    bytes
}

fn trimmed_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

struct Variable {
    name: String,
    is_char: bool,
    len: usize,
    pos: usize,
}

/// Decode an 8-byte IBM mainframe double.
fn ibm_to_f64(bytes: [u8; 8]) -> f64 {
    let negative = bytes[0] & 0x80 != 0;
    let exponent = (bytes[0] & 0x7f) as i32 - 64;
    let mut mantissa: u64 = 0;
    for byte in &bytes[1..] {
        mantissa = (mantissa << 8) | u64::from(*byte);
    }
    if mantissa == 0 {
        return 0.0;
    }
    let fraction = mantissa as f64 / (1u64 << 56) as f64;
    let value = fraction * 16f64.powi(exponent);
    if negative {
        -value
    } else {
        value
    }
}

/// Missing numeric values are a single sentinel byte ('.', '_', or 'A'-'Z')
/// followed by zeros.
fn is_missing_numeric(bytes: &[u8; 8]) -> bool {
    let sentinel = bytes[0];
    (sentinel == b'.' || sentinel == b'_' || sentinel.is_ascii_uppercase())
        && bytes[1..].iter().all(|&b| b == 0)
}

fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn decode_numeric_field(field: &[u8]) -> String {
    // Truncated numerics (2..8 bytes) are zero-extended on the right
    let mut bytes = [0u8; 8];
    let take = field.len().min(8);
    bytes[..take].copy_from_slice(&field[..take]);
    if is_missing_numeric(&bytes) {
        return String::new();
    }
    format_numeric(ibm_to_f64(bytes))
}

/// Read a transport file into a [`Table`].
pub(crate) fn read(path: &Path) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    let lib_prefix = header_prefix("LIBRARY");
    if bytes.len() < (HEADER_RECORDS + 1) * RECORD_LEN
        || !bytes.starts_with(lib_prefix.as_bytes())
    {
        return Err(Error::Transport(
            "not a SAS transport file (missing library header)".to_string(),
        ));
    }
    let record = |index: usize| &bytes[index * RECORD_LEN..(index + 1) * RECORD_LEN];

    if !record(3).starts_with(header_prefix("MEMBER").as_bytes()) {
        return Err(Error::Transport("missing member header record".to_string()));
    }
    if !record(7).starts_with(header_prefix("NAMESTR").as_bytes()) {
        return Err(Error::Transport("missing NAMESTR header record".to_string()));
    }

    // Member descriptor: "SAS     <name>  SASDATA ..."
    let member_name = trimmed_field(&record(5)[8..16]);
    let name = if member_name.is_empty() {
        None
    } else {
        Some(member_name)
    };

    let nvars: usize = std::str::from_utf8(&record(7)[54..58])
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| Error::Transport("invalid variable count".to_string()))?;

    let namestr_start = HEADER_RECORDS * RECORD_LEN;
    let namestr_records = (nvars * NAMESTR_LEN).div_ceil(RECORD_LEN);
    let obs_index = HEADER_RECORDS + namestr_records;
    if bytes.len() < (obs_index + 1) * RECORD_LEN {
        return Err(Error::Transport("truncated NAMESTR block".to_string()));
    }
    if !record(obs_index).starts_with(header_prefix("OBS").as_bytes()) {
        return Err(Error::Transport("missing OBS header record".to_string()));
    }

    let mut variables = Vec::with_capacity(nvars);
    for index in 0..nvars {
        let entry = &bytes[namestr_start + index * NAMESTR_LEN..][..NAMESTR_LEN];
        let mut cursor = entry;
        let ntype = cursor.read_i16::<BigEndian>()?;
        let _nhfun = cursor.read_i16::<BigEndian>()?;
        let nlng = cursor.read_i16::<BigEndian>()?;
        let _nvar0 = cursor.read_i16::<BigEndian>()?;
        let name = trimmed_field(&entry[8..16]);
        let pos = (&entry[NPOS_OFFSET..NPOS_OFFSET + 4]).read_i32::<BigEndian>()?;
        if nlng < 0 || pos < 0 {
            return Err(Error::Transport(format!(
                "invalid NAMESTR entry for variable {}",
                index + 1
            )));
        }
        variables.push(Variable {
            name,
            is_char: ntype == 2,
            len: nlng as usize,
            pos: pos as usize,
        });
    }

    let row_len: usize = variables.iter().map(|v| v.len).sum();
    for variable in &variables {
        if variable.pos + variable.len > row_len {
            return Err(Error::Transport(format!(
                "variable '{}' lies outside the observation record",
                variable.name
            )));
        }
    }

    let mut table = Table::new(variables.iter().map(|v| v.name.clone()).collect());
    table.name = name;

    let data = &bytes[(obs_index + 1) * RECORD_LEN..];
    if row_len > 0 {
        for chunk in data.chunks(row_len) {
            // The final record is space-padded; a short or all-blank chunk
            // marks the end of the observations
            if chunk.len() < row_len || chunk.iter().all(|&b| b == b' ') {
                break;
            }
            let row = variables
                .iter()
                .map(|v| {
                    let field = &chunk[v.pos..v.pos + v.len];
                    if v.is_char {
                        trimmed_field(field)
                    } else {
                        decode_numeric_field(field)
                    }
                })
                .collect();
            table.rows.push(row);
        }
    }
    Ok(table)
}

/// Write a [`Table`] as a transport file. Every variable is emitted as
/// character data sized to the widest cell in its column.
pub(crate) fn write(path: &Path, table: &Table) -> Result<()> {
    let now = Utc::now()
        .format("%d%b%y:%H:%M:%S")
        .to_string()
        .to_uppercase();
    // Member names live inside fixed 80-byte card records, so they must
    // stay ASCII and at most 8 bytes
    let member = table
        .name
        .as_deref()
        .unwrap_or(DEFAULT_MEMBER_NAME)
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .take(8)
        .collect::<String>();

    let lengths: Vec<usize> = (0..table.columns.len())
        .map(|column| {
            table
                .rows
                .iter()
                .map(|row| row.get(column).map(|c| c.len()).unwrap_or(0))
                .max()
                .unwrap_or(0)
                .clamp(1, MAX_FIELD_LEN)
        })
        .collect();

    let mut out: Vec<u8> = Vec::new();
    push_record(&mut out, &header_record("LIBRARY", &"0".repeat(30)));
    push_record(
        &mut out,
        &format!(
            "{:<8}{:<8}{:<8}{:<8}{:<8}{:<24}{}",
            "SAS", "SAS", "SASLIB", "9.4", "Linux", "", now
        ),
    );
    push_record(&mut out, &format!("{:<16}{:<64}", now, ""));
    push_record(
        &mut out,
        &header_record("MEMBER", "000000000000000001600000000140"),
    );
    push_record(&mut out, &header_record("DSCRPTR", &"0".repeat(30)));
    push_record(
        &mut out,
        &format!(
            "{:<8}{:<8}{:<8}{:<8}{:<8}{:<24}{}",
            "SAS", member, "SASDATA", "9.4", "Linux", "", now
        ),
    );
    push_record(&mut out, &format!("{:<16}{:<16}{:<40}{:<8}", now, "", "", ""));
    push_record(
        &mut out,
        &header_record(
            "NAMESTR",
            &format!("000000{:04}{:020}", table.columns.len(), 0),
        ),
    );

    let mut block: Vec<u8> = Vec::new();
    let mut position: i32 = 0;
    for (index, column) in table.columns.iter().enumerate() {
        block.write_i16::<BigEndian>(2)?; // character variable
        block.write_i16::<BigEndian>(0)?;
        block.write_i16::<BigEndian>(lengths[index] as i16)?;
        block.write_i16::<BigEndian>((index + 1) as i16)?;
        block.extend_from_slice(&fixed_field(column, 8));
        block.extend_from_slice(&fixed_field(column, 40));
        block.extend_from_slice(&fixed_field("", 8)); // output format
        block.write_i16::<BigEndian>(0)?;
        block.write_i16::<BigEndian>(0)?;
        block.write_i16::<BigEndian>(0)?;
        block.extend_from_slice(b"  "); // nfill
        block.extend_from_slice(&fixed_field("", 8)); // input format
        block.write_i16::<BigEndian>(0)?;
        block.write_i16::<BigEndian>(0)?;
        block.write_i32::<BigEndian>(position)?;
        block.extend_from_slice(&[b' '; 52]);
        position += lengths[index] as i32;
    }
    while block.len() % RECORD_LEN != 0 {
        block.push(b' ');
    }
    out.extend_from_slice(&block);

    push_record(&mut out, &header_record("OBS", &"0".repeat(30)));
    for row in &table.rows {
        for (index, length) in lengths.iter().enumerate() {
            let cell = row.get(index).map(String::as_str).unwrap_or("");
            out.extend_from_slice(&fixed_field(cell, *length));
        }
    }
    while out.len() % RECORD_LEN != 0 {
        out.push(b' ');
    }

    std::fs::write(path, out)?;
    Ok(())
}
