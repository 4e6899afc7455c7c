//! The interactive boundary.
//!
//! The merger never touches the terminal itself. It talks to a [`Prompt`],
//! and having no prompt at all means the run is non-interactive: missing
//! values fall back to the template defaults.

use std::io::{self, BufRead, Write};

pub trait Prompt {
    /// Show an informational line ahead of the first question.
    fn banner(&mut self, message: &str) -> io::Result<()>;

    /// Ask for `question`, offering `default` (already encoded). Returns the
    /// raw answer; an empty answer means the default.
    fn ask(&mut self, question: &str, default: &str) -> io::Result<String>;
}

/// Line-based prompt over any reader/writer pair.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Questions go to stderr so stdout stays clean for the run summary.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn banner(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    fn ask(&mut self, question: &str, default: &str) -> io::Result<String> {
        write!(self.output, "{question} ({default}): ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // EOF: keep the default, and end the line we left open.
            writeln!(self.output)?;
            return Ok(default.to_string());
        }
        let answer = line.trim_end_matches(['\n', '\r']);
        if answer.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(answer.to_string())
        }
    }
}
