// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedTextRequest type for POST /embed_text/

use serde::{Deserialize, Serialize};

/// Request body for POST /embed_text/
///
/// ```json
/// { "text": "a photo of a cat" }
/// ```
///
/// Only the presence of `text` is checked; other keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbedTextRequest {
    /// Text to embed; absent, null and "" all count as missing
    #[serde(default)]
    pub text: Option<String>,
}

impl EmbedTextRequest {
    /// Returns the text if it is present and non-empty
    pub fn into_text(self) -> Option<String> {
        self.text.filter(|text| !text.is_empty())
    }
}
