//! Interface to the frame-pointer validator.
//!
//! The validator statically inspects functions of a binary and reports the
//! ones compiled without frame-pointer setup. Its disassembly lives elsewhere;
//! this module only fixes the shape of the call and how a failed analysis is
//! surfaced.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A contiguous code region of a binary, usually one function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Offset of the first instruction within the binary
    pub offset: u64,
    /// Size of the region in bytes
    pub size: u64,
    /// Symbol or other identifying name
    #[serde(default)]
    pub name: String,
}

impl CodeBlock {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size)
    }
}

pub trait FramePointerValidator {
    /// Checks the given functions and returns those that were compiled
    /// without frame pointers. `None` means the analysis itself could not be
    /// completed (unreadable file, unsupported format, ...).
    fn fpo_functions(
        &self,
        functions: &[CodeBlock],
        file_name: &Path,
        is_64_bit: bool,
    ) -> Option<Vec<CodeBlock>>;
}

/// Runs `validator` and turns an absent result into a recoverable error.
pub fn validate_frame_pointers(
    validator: &dyn FramePointerValidator,
    functions: &[CodeBlock],
    file_name: &Path,
    is_64_bit: bool,
) -> Result<Vec<CodeBlock>, CoreError> {
    match validator.fpo_functions(functions, file_name, is_64_bit) {
        Some(fpo) => {
            tracing::debug!(
                file = %file_name.display(),
                checked = functions.len(),
                without_frame_pointer = fpo.len(),
                "frame pointer validation finished"
            );
            Ok(fpo)
        }
        None => {
            tracing::warn!(file = %file_name.display(), "frame pointer validation could not complete");
            Err(CoreError::FramePointerValidation(file_name.to_path_buf()))
        }
    }
}
