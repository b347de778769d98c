//! Document rendering - placeholder substitution into a native DOCX artifact.

pub mod docx;
pub mod engine;

pub use engine::{render, RenderedDocument};

use thiserror::Error;

/// Errors raised while producing the native artifact. All of them are fatal
/// for the request: there is no document to fall back to.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The coordinator verifies completeness before calling, so hitting
    /// this is an internal invariant violation.
    #[error("field '{0}' has no value")]
    IncompleteInput(String),
    #[error("substitution failed: {0}")]
    Substitution(String),
    #[error("DOCX packing failed: {0}")]
    Docx(String),
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if ch.is_whitespace() || ch == '-' || ch == '_' || ch == '.' {
            if !last_dash && !result.is_empty() {
                result.push('-');
                last_dash = true;
            }
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Ana Petrova", "doc"), "ana-petrova");
        assert_eq!(sanitize_filename("  spaces  ", "doc"), "spaces");
        assert_eq!(sanitize_filename("@#$%", "doc"), "doc");
        assert_eq!(sanitize_filename("a--b", "doc"), "a-b");
    }
}
