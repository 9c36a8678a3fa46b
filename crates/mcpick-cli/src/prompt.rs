//! Terminal prompts.
//!
//! Every prompt returns `Ok(None)` when the user cancels (Esc, or Ctrl-C on
//! a text prompt), which aborts only the current action.

use std::io::{self, Write};

use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};

/// Input validator: `Err(message)` rejects the value and re-prompts.
pub type Validator<'a> = &'a dyn Fn(&str) -> Result<(), String>;

pub trait Prompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>>;

    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Option<Vec<usize>>>;

    fn input(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        validate: Option<Validator<'_>>,
    ) -> Result<Option<String>>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>>;

    fn note(&mut self, message: &str) -> Result<()>;

    fn warn(&mut self, message: &str) -> Result<()>;
}

/// Validator for fields that must not be blank.
pub fn required(label: &'static str) -> impl Fn(&str) -> Result<(), String> {
    move |value: &str| {
        if value.trim().is_empty() {
            Err(format!("{label} is required"))
        } else {
            Ok(())
        }
    }
}

/// dialoguer-backed prompts writing notes to `W`.
pub struct TerminalPrompter<W: Write = io::Stderr> {
    theme: ColorfulTheme,
    writer: W,
}

impl TerminalPrompter<io::Stderr> {
    pub fn new() -> Self {
        Self::with_writer(io::stderr())
    }
}

impl Default for TerminalPrompter<io::Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalPrompter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            theme: ColorfulTheme::default(),
            writer,
        }
    }
}

impl<W: Write> Prompter for TerminalPrompter<W> {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<Option<usize>> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()?)
    }

    fn multi_select(
        &mut self,
        prompt: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Option<Vec<usize>>> {
        Ok(MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact_opt()?)
    }

    fn input(
        &mut self,
        prompt: &str,
        default: Option<&str>,
        validate: Option<Validator<'_>>,
    ) -> Result<Option<String>> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        if let Some(validate) = validate {
            input = input.validate_with(move |value: &String| validate(value.as_str()));
        }
        cancelled_as_none(input.interact_text())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<Option<bool>> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()?)
    }

    fn note(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer)?;
        for line in message.lines() {
            writeln!(self.writer, "  {line}")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<()> {
        for line in message.lines() {
            writeln!(self.writer, "{} {line}", style("warning:").yellow().bold())?;
        }
        Ok(())
    }
}

/// Text input has no `interact_opt`; an interrupted read counts as cancel.
fn cancelled_as_none(result: dialoguer::Result<String>) -> Result<Option<String>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(dialoguer::Error::IO(err)) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_text_input_is_cancel() {
        let interrupted = io::Error::new(io::ErrorKind::Interrupted, "read interrupted");
        assert_eq!(
            cancelled_as_none(Err(dialoguer::Error::IO(interrupted))).unwrap(),
            None
        );
        assert_eq!(
            cancelled_as_none(Ok("work".to_string())).unwrap(),
            Some("work".to_string())
        );

        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        assert!(cancelled_as_none(Err(dialoguer::Error::IO(broken))).is_err());
    }

    #[test]
    fn test_required_rejects_blank() {
        let validate = required("Server name");
        assert_eq!(validate("  "), Err("Server name is required".to_string()));
        assert_eq!(validate("fs"), Ok(()));
    }

    #[test]
    fn test_note_and_warn_write_to_writer() {
        console::set_colors_enabled(false);
        let mut prompter = TerminalPrompter::with_writer(Vec::new());
        prompter.note("line one\nline two").unwrap();
        prompter.warn("careful").unwrap();

        let output = String::from_utf8(prompter.writer).unwrap();
        assert_eq!(output, "\n  line one\n  line two\n\nwarning: careful\n");
    }
}
