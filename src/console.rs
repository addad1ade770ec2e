//! The input/output seam between menus, prompts and the user.

use crate::error::ConsoleError;
use rustyline::completion::Completer;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator as LineValidator;
use rustyline::{Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::io::Write;

/// A line-oriented text console.
///
/// Exactly one menu loop or prompt uses the console at a time; it is handed
/// down as `&mut dyn Console`.
pub trait Console {
    /// Writes one line of output.
    fn write_line(&mut self, line: &str) -> Result<(), ConsoleError>;

    /// Shows `label` and reads one line, without its line terminator.
    fn read_line(&mut self, label: &str) -> Result<String, ConsoleError>;

    /// Like [`Console::read_line`], but the typed text is not displayed.
    fn read_secret(&mut self, label: &str) -> Result<String, ConsoleError>;

    /// Reads a menu selection.
    fn read_key(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.read_line(label)
    }
}

/// Hides typed characters while `masking` is set.
#[derive(Default)]
struct MaskingHelper {
    masking: bool,
}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned("*".repeat(line.chars().count()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, kind: CmdKind) -> bool {
        match kind {
            CmdKind::MoveCursor => false,
            _ => self.masking,
        }
    }
}

impl Completer for MaskingHelper {
    type Candidate = String;
}

impl Hinter for MaskingHelper {
    type Hint = String;
}

impl LineValidator for MaskingHelper {}

impl Helper for MaskingHelper {}

/// Interactive console on the process terminal, backed by rustyline.
///
/// Plain lines go into the editor history; secrets and menu keys do not.
pub struct Terminal {
    editor: Editor<MaskingHelper, DefaultHistory>,
}

impl Terminal {
    pub fn new() -> Result<Self, ConsoleError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(MaskingHelper::default()));
        Ok(Self { editor })
    }

    fn set_masking(&mut self, masking: bool) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.masking = masking;
        }
    }
}

impl Console for Terminal {
    fn write_line(&mut self, line: &str) -> Result<(), ConsoleError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }

    fn read_line(&mut self, label: &str) -> Result<String, ConsoleError> {
        let line = self.editor.readline(label)?;
        if !line.trim().is_empty() {
            self.editor.add_history_entry(line.as_str())?;
        }
        Ok(line)
    }

    fn read_secret(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.set_masking(true);
        let line = self.editor.readline(label);
        self.set_masking(false);
        Ok(line?)
    }

    fn read_key(&mut self, label: &str) -> Result<String, ConsoleError> {
        Ok(self.editor.readline(label)?)
    }
}
