//! Integration test: frame pointer validator interface
//!
//! Uses canned validators to check how results and failed analyses are
//! surfaced to callers.

use std::path::Path;

use vkprobe_core::frame_pointer::{validate_frame_pointers, CodeBlock, FramePointerValidator};
use vkprobe_core::CoreError;

/// Reports every block whose name starts with "fpo_", or fails for 32-bit code.
struct CannedValidator;

impl FramePointerValidator for CannedValidator {
    fn fpo_functions(
        &self,
        functions: &[CodeBlock],
        _file_name: &Path,
        is_64_bit: bool,
    ) -> Option<Vec<CodeBlock>> {
        if !is_64_bit {
            return None;
        }
        Some(
            functions
                .iter()
                .filter(|f| f.name.starts_with("fpo_"))
                .cloned()
                .collect(),
        )
    }
}

fn block(offset: u64, size: u64, name: &str) -> CodeBlock {
    CodeBlock {
        offset,
        size,
        name: name.to_string(),
    }
}

#[test]
fn test_returns_subset_without_frame_pointers() {
    let functions = vec![
        block(0x1000, 0x40, "main"),
        block(0x1040, 0x20, "fpo_leaf"),
        block(0x1060, 0x80, "fpo_memcpy"),
    ];

    let fpo = validate_frame_pointers(&CannedValidator, &functions, Path::new("libapp.so"), true)
        .expect("analysis completes");

    assert_eq!(fpo, vec![functions[1].clone(), functions[2].clone()]);
    assert_eq!(fpo[1].end(), 0x10e0);
}

#[test]
fn test_failed_analysis_is_an_error_not_a_panic() {
    let functions = vec![block(0x10, 0x10, "fpo_leaf")];

    let err = validate_frame_pointers(&CannedValidator, &functions, Path::new("lib32.so"), false)
        .unwrap_err();

    match err {
        CoreError::FramePointerValidation(path) => assert_eq!(path, Path::new("lib32.so")),
        other => panic!("expected FramePointerValidation, got {:?}", other),
    }
}

#[test]
fn test_empty_input() {
    let fpo = validate_frame_pointers(&CannedValidator, &[], Path::new("libapp.so"), true)
        .expect("analysis completes");
    assert!(fpo.is_empty());
}
