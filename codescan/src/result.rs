use serde::{Deserialize, Serialize};

use crate::error::PayloadError;
use crate::payload::ItemPayload;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Corners of a detected code, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedCode {
    pub text: String,
    pub bytes: Vec<u8>,
    pub location: Location,
}

impl DecodedCode {
    pub fn new(text: impl Into<String>, location: Location) -> Self {
        let text = text.into();
        Self {
            bytes: text.as_bytes().to_vec(),
            text,
            location,
        }
    }

    pub fn payload(&self) -> Result<ItemPayload, PayloadError> {
        ItemPayload::parse(&self.text)
    }
}

/// Outcome of one decode attempt. `NotFound` is an ordinary answer,
/// not a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum DecodeResult {
    Found(DecodedCode),
    #[default]
    NotFound,
}

impl DecodeResult {
    pub fn is_found(&self) -> bool {
        matches!(self, DecodeResult::Found(_))
    }

    pub fn code(&self) -> Option<&DecodedCode> {
        match self {
            DecodeResult::Found(code) => Some(code),
            DecodeResult::NotFound => None,
        }
    }

    pub fn into_code(self) -> Option<DecodedCode> {
        match self {
            DecodeResult::Found(code) => Some(code),
            DecodeResult::NotFound => None,
        }
    }
}

impl From<Option<DecodedCode>> for DecodeResult {
    fn from(code: Option<DecodedCode>) -> Self {
        code.map_or(DecodeResult::NotFound, DecodeResult::Found)
    }
}
