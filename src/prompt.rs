//! Confirmation policy and per-run session state.
//!
//! The engine never talks to the terminal directly: when it needs a yes/no
//! decision it asks the [`Session`], which consults remembered "always"
//! answers before delegating to a [`Confirm`] implementation.
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::ProgramError;

/// Answer to a confirmation question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Yes, and do not ask this question again during the run.
    YesAlways,
    /// Yes, this time only.
    YesOnce,
    /// No, and do not ask this question again during the run.
    NoAlways,
    /// No, this time only.
    NoOnce,
    /// Stop the whole run.
    Abort,
}

impl Decision {
    /// Parse a single prompt answer: `y`, `Y`, `n`, `N` or `a`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "y" | "yes" => Some(Self::YesOnce),
            "Y" | "YES" => Some(Self::YesAlways),
            "n" | "no" => Some(Self::NoOnce),
            "N" | "NO" => Some(Self::NoAlways),
            "a" | "abort" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// Questions the engine may ask; answers are remembered per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    /// Delete the contents of a non-empty backup directory.
    PurgeBackups,
}

/// Something that can answer confirmation questions.
pub trait Confirm: std::fmt::Debug {
    /// Ask `prompt` and return the decision.
    fn confirm(&mut self, prompt: &str) -> Decision;
}

/// Always returns the same decision (`--yes` / `--no`).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub Decision);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _prompt: &str) -> Decision {
        self.0
    }
}

/// Interactive prompt reading answers line by line.
///
/// Invalid answers are re-asked; end of input, a failed read and an
/// interrupt all count as [`Decision::Abort`].
#[derive(Debug)]
pub struct Prompt<R, W> {
    input: R,
    output: W,
    interrupted: Option<Arc<AtomicBool>>,
}

impl Prompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    /// Prompt on arbitrary reader and writer.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            interrupted: None,
        }
    }

    /// Abort as soon as `flag` is set, whatever was typed.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(flag);
        self
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Decision> {
        loop {
            write!(
                self.output,
                "{prompt} [y]es / [Y]es always / [n]o / [N]o always / [a]bort: "
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 || self.is_interrupted() {
                writeln!(self.output)?;
                return Ok(Decision::Abort);
            }
            if let Some(decision) = Decision::parse(&line) {
                return Ok(decision);
            }
            writeln!(self.output, "invalid answer '{}'", line.trim())?;
        }
    }
}

impl<R: BufRead + std::fmt::Debug, W: Write + std::fmt::Debug> Confirm for Prompt<R, W> {
    fn confirm(&mut self, prompt: &str) -> Decision {
        self.ask(prompt).unwrap_or(Decision::Abort)
    }
}

/// State threaded through one invocation.
#[derive(Debug)]
pub struct Session {
    confirm: Box<dyn Confirm>,
    remembered: HashMap<Question, bool>,
    interrupted: Arc<AtomicBool>,
}

impl Session {
    /// Create a session answering questions through `confirm`.
    #[must_use]
    pub fn new(confirm: Box<dyn Confirm>) -> Self {
        Self {
            confirm,
            remembered: HashMap::new(),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an interrupt flag (set by a Ctrl-C handler).
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Ask `question`, honouring remembered "always" answers.
    ///
    /// An interrupt raised while the question is pending wins over the
    /// answer.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Aborted`] if the user aborts, or
    /// [`ProgramError::Interrupted`] if the run was interrupted before or
    /// while asking.
    pub fn ask(&mut self, question: Question, prompt: &str) -> Result<bool, ProgramError> {
        self.check_interrupt()?;
        if let Some(&answer) = self.remembered.get(&question) {
            return Ok(answer);
        }
        let decision = self.confirm.confirm(prompt);
        self.check_interrupt()?;
        match decision {
            Decision::YesAlways => {
                self.remembered.insert(question, true);
                Ok(true)
            }
            Decision::NoAlways => {
                self.remembered.insert(question, false);
                Ok(false)
            }
            Decision::YesOnce => Ok(true),
            Decision::NoOnce => Ok(false),
            Decision::Abort => Err(ProgramError::Aborted),
        }
    }

    /// Fail if the run has been interrupted.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::Interrupted`] once the interrupt flag is set.
    pub fn check_interrupt(&self) -> Result<(), ProgramError> {
        if self.interrupted.load(Ordering::SeqCst) {
            return Err(ProgramError::Interrupted);
        }
        Ok(())
    }
}

/// Replays a fixed list of decisions and counts how often it was asked.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct Scripted {
    answers: std::collections::VecDeque<Decision>,
    pub(crate) asked: Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl Scripted {
    pub(crate) fn new(answers: &[Decision]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Arc::default(),
        }
    }
}

#[cfg(test)]
impl Confirm for Scripted {
    fn confirm(&mut self, _prompt: &str) -> Decision {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answers.pop_front().unwrap_or(Decision::Abort)
    }
}
