// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Method-channel message types exchanged with the host application.
//
// Hosts marshal calls and responses through JSON, so every type here is
// serde-serializable. Byte arguments travel as arrays of numbers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stempelwerk_core::error::Result;

/// Name of the channel the host registers.
pub const CHANNEL_NAME: &str = "pdf_stamp_editor";

/// The only method the channel implements.
pub const STAMP_PDF: &str = "stampPdf";

/// Missing, mistyped, or empty arguments.
pub const BAD_ARGS: &str = "BAD_ARGS";

/// Decoding or stamping failed.
pub const STAMP_FAILED: &str = "STAMP_FAILED";

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MethodValue {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl MethodValue {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// An incoming method invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, MethodValue>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: MethodValue) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    /// The named argument, if present and a byte array.
    pub fn bytes_argument(&self, name: &str) -> Option<&[u8]> {
        self.arguments.get(name).and_then(MethodValue::as_bytes)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The result handed back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        result: Vec<u8>,
    },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn error(code: &str, message: impl Into<String>, details: Option<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Error code, for `Error` responses.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
