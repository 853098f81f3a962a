// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// OTLP export response body. An empty `partialSuccess` means everything
/// was accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub partial_success: PartialSuccess,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSuccess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_items: Option<i64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_message: String,
}

/// Reply to `POST /api/shutdown`, sent before the receiver starts draining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutdownResponse {
    pub accepted: bool,
    pub pid: u32,
}

/// Body for non-2xx replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
