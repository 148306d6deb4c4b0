//! Plain-text session view for terminals.

use std::io::Write;

use log::{debug, warn};
use tryit::{CellId, CellRunner, SessionView};

/// Writes each evaluation as an `In [n]:` header followed by its streamed
/// output.
pub struct TerminalView<W: Write> {
    out: W,
    /// Whether the last thing written ended a line
    at_line_start: bool,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            at_line_start: true,
        }
    }

    fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("[host] Failed to write to terminal: {}", e);
            return;
        }
        self.at_line_start = text.ends_with('\n');
    }

    fn end_line(&mut self) {
        if !self.at_line_start {
            self.write("\n");
        }
    }
}

impl<W: Write> SessionView for TerminalView<W> {
    fn append_cell(&mut self, cell: CellId, _input: &str, _runner: CellRunner) {
        debug!("[host] Cell {} added", cell);
    }

    fn reset_output(&mut self, cell: CellId, source: &str) {
        self.end_line();
        let prompt = format!("In [{}]: ", cell.index() + 1);
        let indent = " ".repeat(prompt.len());
        let mut header = String::new();
        for (i, line) in source.lines().enumerate() {
            header.push_str(if i == 0 { &prompt } else { &indent });
            header.push_str(line);
            header.push('\n');
        }
        if header.is_empty() {
            header.push_str(prompt.trim_end());
            header.push('\n');
        }
        self.write(&header);
    }

    fn append_output(&mut self, _cell: CellId, text: &str) {
        self.write(text);
    }

    fn focus_input(&mut self, _cell: CellId) {
        self.end_line();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut TerminalView<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        let mut view = TerminalView::new(&mut buf);
        f(&mut view);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_then_streamed_output() {
        let text = render(|view| {
            view.reset_output(CellId(0), "1+1");
            view.append_output(CellId(0), "2");
            view.focus_input(CellId(1));
        });
        assert_eq!(text, "In [1]: 1+1\n2\n");
    }

    #[test]
    fn test_multiline_source_is_indented() {
        let text = render(|view| view.reset_output(CellId(2), "let x := 1\nx + 1"));
        assert_eq!(text, "In [3]: let x := 1\n        x + 1\n");
    }

    #[test]
    fn test_empty_source_prints_bare_prompt() {
        let text = render(|view| view.reset_output(CellId(0), ""));
        assert_eq!(text, "In [1]:\n");
    }

    #[test]
    fn test_output_ending_in_newline_is_not_doubled() {
        let text = render(|view| {
            view.reset_output(CellId(0), "print(1)");
            view.append_output(CellId(0), "1\n");
            view.focus_input(CellId(1));
            view.reset_output(CellId(1), "2");
        });
        assert_eq!(text, "In [1]: print(1)\n1\nIn [2]: 2\n");
    }
}
