//! Operator confirmation at gated decision points.
//!
//! A decision is one line of input: proceed iff its first character is `y`.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Ask the operator a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Whether a response line means "proceed".
pub fn is_affirmative(response: &str) -> bool {
    response.starts_with('y')
}

/// Prompts on stdout and blocks on one line of stdin. No timeout.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stdout = io::stdout();
        writeln!(stdout, "{prompt}")?;
        stdout.flush()?;
        read_decision(&mut io::stdin().lock())
    }
}

/// Read one decision line from `reader`. End of input declines.
pub fn read_decision(reader: &mut impl BufRead) -> io::Result<bool> {
    let mut input = String::new();
    reader.read_line(&mut input)?;
    Ok(is_affirmative(&input))
}

/// `--auto-approve`: every prompt is answered yes without reading input.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        tracing::debug!("auto-approved: {prompt}");
        Ok(true)
    }
}

/// Pre-recorded answers, consumed in order. An exhausted script declines.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    /// Every prompt asked so far.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or(false))
    }
}
