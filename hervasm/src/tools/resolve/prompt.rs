//! Operator input for overlap groups without a scripted command.
//!
//! The read loop is split in two: [`PromptState`] is a pure state machine
//! fed one input line at a time, and a [`CommandSource`] drives it over
//! some input. [`LinePrompt`] reads from any `BufRead`; the console has a
//! terminal implementation.

use std::io::{
    BufRead,
    Write,
};

use crate::tools::overlap::OverlapGroup;
use crate::tools::resolve::command::ResolutionCommand;

pub const PROMPT_HELP: &str = "Options are:
    ignore                    - Do nothing, do not change annotations
    reject loc1[,loc2,...]    - Remove locs from annotations
    diff loc1-loc2            - Shorten loc1 to eliminate overlap with loc2
    merge loc1+loc2           - Combine loc1 and loc2
";

pub const PROMPT_TEXT: &str = "***Action to take (? for help): ";
pub const INVALID_BANNER: &str = "INPUT IS INVALID";

/// Supplies resolution commands for groups that have none in the script.
pub trait CommandSource {
    fn next_command(
        &mut self,
        group: &OverlapGroup,
    ) -> anyhow::Result<ResolutionCommand>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PromptState {
    AwaitingCommand {
        /// Why the previous line was refused.
        error:     Option<String>,
        show_help: bool,
    },
    Validated(ResolutionCommand),
}

impl PromptState {
    pub fn start() -> Self {
        PromptState::AwaitingCommand {
            error:     None,
            show_help: false,
        }
    }

    /// Consumes one line of operator input.
    pub fn advance(
        self,
        line: &str,
        group: &OverlapGroup,
    ) -> Self {
        if let PromptState::Validated(_) = self {
            return self;
        }
        let line = line.trim();
        if line == "?" {
            return PromptState::AwaitingCommand {
                error:     None,
                show_help: true,
            };
        }
        let parsed = ResolutionCommand::parse_line(line).and_then(|command| {
            command.validate(group.id, &group.locus_ids())?;
            Ok(command)
        });
        match parsed {
            Ok(command) => PromptState::Validated(command),
            Err(e) => {
                PromptState::AwaitingCommand {
                    error:     Some(e.to_string()),
                    show_help: false,
                }
            },
        }
    }

    pub fn is_validated(&self) -> bool { matches!(self, PromptState::Validated(_)) }

    /// Prompt line, prefixed with a banner when the last input was refused.
    pub fn prompt(&self) -> String {
        let banner = match self {
            PromptState::AwaitingCommand {
                error: Some(_), ..
            } => INVALID_BANNER,
            _ => "",
        };
        format!("{:<20}{}", banner, PROMPT_TEXT)
    }
}

/// Prompts on `writer` and reads answers line by line from `reader`.
pub struct LinePrompt<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(
        reader: R,
        writer: W,
    ) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) { (self.reader, self.writer) }
}

impl<R: BufRead, W: Write> CommandSource for LinePrompt<R, W> {
    fn next_command(
        &mut self,
        group: &OverlapGroup,
    ) -> anyhow::Result<ResolutionCommand> {
        writeln!(self.writer, "{}", group.describe())?;
        let mut state = PromptState::start();
        loop {
            match state {
                PromptState::Validated(command) => return Ok(command),
                PromptState::AwaitingCommand {
                    ref error,
                    show_help,
                } => {
                    if show_help {
                        writeln!(self.writer, "{}", PROMPT_HELP)?;
                    }
                    if let Some(error) = error {
                        writeln!(self.writer, "{}", error)?;
                    }
                    write!(self.writer, "{}", state.prompt())?;
                    self.writer.flush()?;

                    let mut line = String::new();
                    if self.reader.read_line(&mut line)? == 0 {
                        anyhow::bail!("Input ended before a command was given for group {}", group.id);
                    }
                    state = state.advance(&line, group);
                },
            }
        }
    }
}
