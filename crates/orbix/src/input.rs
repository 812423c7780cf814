//! Response input handling.

use std::io::Read;
use std::path::Path;

/// Read a response from `path`, or from stdin when `path` is `None` or `-`.
pub(crate) fn read_response(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
