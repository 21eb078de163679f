use console::style;
use dialoguer::Input;
use hervasm::prelude::*;
use hervasm::tools::resolve::PROMPT_HELP;

/// Asks the operator on the terminal for a command per overlap group.
pub(crate) struct TerminalPrompt;

impl CommandSource for TerminalPrompt {
    fn next_command(
        &mut self,
        group: &OverlapGroup,
    ) -> anyhow::Result<ResolutionCommand> {
        eprintln!("{}", style(group.describe()).cyan());
        let mut state = PromptState::start();
        loop {
            match state {
                PromptState::Validated(command) => return Ok(command),
                PromptState::AwaitingCommand {
                    ref error,
                    show_help,
                } => {
                    if show_help {
                        eprintln!("{}", PROMPT_HELP);
                    }
                    if let Some(error) = error {
                        eprintln!("{}", style(error).red());
                    }
                    let prompt = state.prompt();
                    let line: String = Input::new()
                        .with_prompt(prompt.trim_end_matches([' ', ':']))
                        .allow_empty(true)
                        .interact_text()?;
                    state = state.advance(&line, group);
                },
            }
        }
    }
}

/// Terminal prompt when stdin is a terminal, a line prompt over stdin
/// otherwise.
pub(crate) fn command_source() -> Box<dyn CommandSource> {
    use std::io::IsTerminal;

    if std::io::stdin().is_terminal() {
        Box::new(TerminalPrompt)
    }
    else {
        Box::new(LinePrompt::new(
            std::io::stdin().lock(),
            std::io::stderr(),
        ))
    }
}
