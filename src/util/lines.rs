//! Line-oriented reader for the bracketed-section text files.
//!
//! Both module descriptors (`Config.txt`) and per-variant overrides
//! (`Config.<name>.txt`) use the same shape:
//!
//! ```text
//! [DEPENDENCIES]
//! CORE_zlib
//! CORE_bzlib
//!
//! [VISUAL_STUDIO]
//! 2019
//! ```
//!
//! A section's entries run until the first blank line or end of file.

use std::str::Lines;

/// Cursor over the lines of a section file.
pub struct SectionReader<'a> {
    lines: Lines<'a>,
}

impl<'a> SectionReader<'a> {
    pub fn new(text: &'a str) -> Self {
        SectionReader {
            lines: text.lines(),
        }
    }

    /// Next line, trimmed. `None` at end of file.
    pub fn next_line(&mut self) -> Option<&'a str> {
        self.lines.next().map(str::trim)
    }

    /// Next line with only trailing whitespace removed.
    pub fn next_raw_line(&mut self) -> Option<&'a str> {
        self.lines.next().map(str::trim_end)
    }

    /// Append the current section's entries to `container`, skipping values
    /// already present. Backslashes are normalized to forward slashes.
    pub fn read_into(&mut self, container: &mut Vec<String>) {
        while let Some(line) = self.next_line() {
            if line.is_empty() {
                return;
            }
            push_unique(container, normalize_separators(line));
        }
    }

    /// Read exactly one entry (the line following a single-value header).
    pub fn read_value(&mut self) -> Option<String> {
        self.next_line()
            .filter(|line| !line.is_empty())
            .map(normalize_separators)
    }
}

/// Replace Windows path separators.
pub fn normalize_separators(line: &str) -> String {
    line.replace('\\', "/")
}

/// Push `value` unless it is already present.
pub fn push_unique(container: &mut Vec<String>, value: String) {
    if !container.contains(&value) {
        container.push(value);
    }
}

/// Append every value of `input` missing from `output`, in input order.
pub fn merge_unique(input: &[String], output: &mut Vec<String>) {
    for value in input {
        if !output.contains(value) {
            output.push(value.clone());
        }
    }
}
