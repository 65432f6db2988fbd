//! Per-file context handed to rules.

use std::path::{Path, PathBuf};

/// Context for the file currently being analyzed.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path of the file as discovered.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
        }
    }

    /// Calculates the byte offset of a 1-indexed line and column.
    ///
    /// Out-of-range lines map to the end of the content.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.content.split_inclusive('\n').enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len();
        }

        offset
    }

    /// Length in bytes of a 1-indexed line, without its terminator.
    #[must_use]
    pub fn line_length(&self, line: usize) -> usize {
        line.checked_sub(1)
            .and_then(|i| self.content.lines().nth(i))
            .map_or(0, str::len)
    }
}
