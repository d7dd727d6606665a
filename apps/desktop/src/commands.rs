//! Interactive commands read from stdin and their effect on the session.

use client_core::{GenerationSession, SubmitOutcome};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  prompt <text>   set the story prompt
  count <n>       number of scenes to generate (1-10)
  generate        request the story
  next | n        next scene
  prev | p        previous scene
  jump <n>        go to scene n
  show            print the current state again
  reset           cancel any request and start over
  help            this text
  quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Prompt(String),
    Count(i64),
    Generate,
    Next,
    Previous,
    Jump(usize),
    Show,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "prompt" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("prompt <text>"));
            }
            Command::Prompt(rest.to_string())
        }
        "count" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("count <n>"));
            }
            let value = rest
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidNumber(rest.to_string()))?;
            Command::Count(value)
        }
        "jump" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("jump <scene number>"));
            }
            let value = rest
                .parse::<usize>()
                .map_err(|_| CommandError::InvalidNumber(rest.to_string()))?;
            Command::Jump(value)
        }
        "generate" | "go" => Command::Generate,
        "next" | "n" => Command::Next,
        "prev" | "previous" | "p" => Command::Previous,
        "show" => Command::Show,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue { notice: Option<String> },
    Quit,
}

impl Flow {
    fn notice(message: impl Into<String>) -> Self {
        Flow::Continue {
            notice: Some(message.into()),
        }
    }

    fn quiet() -> Self {
        Flow::Continue { notice: None }
    }
}

pub fn apply_command(session: &mut GenerationSession, command: Command) -> Flow {
    match command {
        Command::Prompt(text) => {
            session.update_prompt_draft(text);
            Flow::quiet()
        }
        Command::Count(value) => match session.update_scene_count_draft(value) {
            Ok(_) => Flow::quiet(),
            Err(err) => Flow::notice(err.to_string()),
        },
        Command::Generate => match session.submit() {
            Ok(SubmitOutcome::Started { .. }) => Flow::quiet(),
            Ok(SubmitOutcome::AlreadyGenerating) => {
                Flow::notice("a story is already being generated; wait for it or `reset`")
            }
            Err(err) => Flow::notice(err.to_string()),
        },
        Command::Next => match session.navigator_mut().map(|navigator| navigator.next()) {
            Some(true) => Flow::quiet(),
            Some(false) => Flow::notice("already at the last scene"),
            None => Flow::notice("no story to browse yet"),
        },
        Command::Previous => match session.navigator_mut().map(|navigator| navigator.previous()) {
            Some(true) => Flow::quiet(),
            Some(false) => Flow::notice("already at the first scene"),
            None => Flow::notice("no story to browse yet"),
        },
        Command::Jump(scene_number) => match session.navigator_mut() {
            Some(navigator) => {
                let moved = scene_number
                    .checked_sub(1)
                    .is_some_and(|index| navigator.jump_to(index));
                if moved {
                    Flow::quiet()
                } else {
                    Flow::notice(format!(
                        "no scene {scene_number}; the story has {} scenes",
                        navigator.len()
                    ))
                }
            }
            None => Flow::notice("no story to browse yet"),
        },
        Command::Show => Flow::quiet(),
        Command::Reset => {
            session.reset();
            Flow::quiet()
        }
        Command::Help => Flow::notice(HELP),
        Command::Quit => Flow::Quit,
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
