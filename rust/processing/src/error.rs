// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Parse error: {0}")]
    Parse(#[from] msh_lite_core::Error),

    #[error("Write error: {0}")]
    Write(#[from] msh_lite_core::WriteError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
