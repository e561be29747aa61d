//! Indentation-aware text builder for emitted JavaScript.

/// Accumulates output text line by line with indentation tracking.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buffer: String,
    indent_level: u32,
}

const INDENT: &str = "  ";

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        CodeWriter {
            buffer: String::with_capacity(capacity),
            indent_level: 0,
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Write a full line at the current indentation.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Write several lines at once.
    pub fn lines<'a>(&mut self, lines: impl IntoIterator<Item = &'a str>) {
        for l in lines {
            self.line(l);
        }
    }

    pub fn blank_line(&mut self) {
        if !self.buffer.ends_with("\n\n") && !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}
