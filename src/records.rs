use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct InputRecord {
    pub text: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    // Numbers are rendered with their JSON text; empty strings count as absent.
    pub fn field(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(value) if !value.is_empty() => Some(value.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    pub fn full_address(&self) -> Option<String> {
        self.field("full_address_computed")
    }

    pub fn city(&self) -> Option<String> {
        self.field("city")
    }

    pub fn street(&self) -> Option<String> {
        self.field("street")
    }

    pub fn house_number(&self) -> Option<String> {
        self.field("house_number")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub text: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Error)]
pub enum LineRejection {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing 'text' or 'metadata'")]
    MissingFields,
}

pub fn parse_line(line: &str) -> Result<InputRecord, LineRejection> {
    let value: Value = serde_json::from_str(line.trim())?;
    let Value::Object(mut fields) = value else {
        return Err(LineRejection::MissingFields);
    };

    let text = match fields.remove("text") {
        Some(Value::String(text)) if !text.is_empty() => text,
        _ => return Err(LineRejection::MissingFields),
    };
    let metadata = match fields.remove("metadata") {
        Some(Value::Object(metadata)) if !metadata.is_empty() => metadata,
        _ => return Err(LineRejection::MissingFields),
    };

    Ok(InputRecord {
        text,
        metadata: Metadata::new(metadata),
    })
}

pub fn read_input(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|err| AppError::input(path, err))
}

pub fn write_output(path: &Path, records: &[OutputRecord]) -> AppResult<()> {
    let file = File::create(path).map_err(|err| AppError::output(path, err))?;
    let mut writer = BufWriter::new(file);
    for record in records {
        let line = encode_record(record)?;
        writeln!(writer, "{line}").map_err(|err| AppError::output(path, err))?;
    }
    writer.flush().map_err(|err| AppError::output(path, err))
}

pub fn encode_record(record: &OutputRecord) -> AppResult<String> {
    Ok(serde_json::to_string(record)?)
}
