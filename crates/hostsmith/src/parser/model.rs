/// Result of normalizing one line.
///
/// `None` means the line is dropped from the output. `Some("")` is a kept
/// empty line, which only happens when `omit_empty_line` is off.
pub type ParsedLine = Option<String>;

/// One line of an input file, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Zero-based position in the source file.
    pub index: usize,
    pub text: String,
}

impl Line {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}
