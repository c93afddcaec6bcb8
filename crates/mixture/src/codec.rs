//! Compact pipe-delimited encoding of mixture records.
//!
//! One record per line:
//! `name|ratio|minThrust|maxThrust|time|value|inSlope|outSlope|...` with the four curve fields
//! repeated per key. Floats use Rust's shortest round-trip formatting.

use emr_curve::KeyframeCurve;
use thiserror::Error;

use crate::MixtureRecord;

pub const DELIMITER: char = '|';

const SCALAR_FIELDS: [&str; 3] = ["ratio", "minThrust", "maxThrust"];
const KEY_FIELDS: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("line {line}: missing field `{field}`")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line}: field `{field}` is not a number: '{value}'")]
    InvalidNumber {
        line: usize,
        field: String,
        value: String,
    },
    #[error("line {line}: {fields} trailing curve field(s) do not form a complete key")]
    IncompleteKeyframe { line: usize, fields: usize },
    #[error("configuration name '{name}' contains a reserved character")]
    ReservedCharacter { name: String },
}

/// Encode one record as a single line.
pub fn encode_record(record: &MixtureRecord) -> Result<String, CodecError> {
    if record.name.contains(DELIMITER) || record.name.contains('\n') {
        return Err(CodecError::ReservedCharacter {
            name: record.name.clone(),
        });
    }
    let mut fields = vec![
        record.name.clone(),
        record.ratio.to_string(),
        record.min_thrust.to_string(),
        record.max_thrust.to_string(),
    ];
    for key in record.curve.keys() {
        fields.push(key.time.to_string());
        fields.push(key.value.to_string());
        fields.push(key.in_slope.to_string());
        fields.push(key.out_slope.to_string());
    }
    Ok(fields.join(&DELIMITER.to_string()))
}

/// Encode records one per line, preserving their order.
pub fn encode_records<'a, I>(records: I) -> Result<String, CodecError>
where
    I: IntoIterator<Item = &'a MixtureRecord>,
{
    let lines = records
        .into_iter()
        .map(encode_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

/// Decode a single line. `line` is only used for error reporting (1-based).
pub fn decode_record(text: &str, line: usize) -> Result<MixtureRecord, CodecError> {
    let mut parts = text.trim_end_matches(['\r', DELIMITER]).split(DELIMITER);
    let name = parts
        .next()
        .ok_or(CodecError::MissingField {
            line,
            field: "name",
        })?
        .to_string();

    let mut scalars = [0.0; 3];
    for (slot, field) in scalars.iter_mut().zip(SCALAR_FIELDS) {
        let raw = parts.next().ok_or(CodecError::MissingField { line, field })?;
        *slot = parse_number(raw, line, field)?;
    }

    let rest: Vec<&str> = parts.collect();
    if rest.len() % KEY_FIELDS != 0 {
        return Err(CodecError::IncompleteKeyframe {
            line,
            fields: rest.len() % KEY_FIELDS,
        });
    }

    let mut curve = KeyframeCurve::new();
    for (index, chunk) in rest.chunks(KEY_FIELDS).enumerate() {
        let field = |name: &str| format!("key[{index}].{name}");
        curve.add_with_slopes(
            parse_number(chunk[0], line, &field("time"))?,
            parse_number(chunk[1], line, &field("value"))?,
            parse_number(chunk[2], line, &field("inSlope"))?,
            parse_number(chunk[3], line, &field("outSlope"))?,
        );
    }

    let [ratio, min_thrust, max_thrust] = scalars;
    Ok(MixtureRecord {
        name,
        ratio,
        min_thrust,
        max_thrust,
        curve,
    })
}

/// Decode every non-blank line.
pub fn decode_records(text: &str) -> Result<Vec<MixtureRecord>, CodecError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| decode_record(line, index + 1))
        .collect()
}

fn parse_number(raw: &str, line: usize, field: &str) -> Result<f64, CodecError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CodecError::InvalidNumber {
            line,
            field: field.to_string(),
            value: raw.to_string(),
        })
}
