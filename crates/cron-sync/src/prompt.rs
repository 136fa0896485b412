//! Line-oriented yes/no prompting over arbitrary reader/writer pairs.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// `y` or `Y`, surrounding whitespace ignored. Everything else, including
/// end of input, is a no.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.output, "{}", line)
    }

    pub fn confirm(&mut self, question: &str) -> io::Result<bool> {
        write!(self.output, "{} (y/n): ", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
