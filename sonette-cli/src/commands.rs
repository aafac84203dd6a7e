//! Line commands typed at the prompt.

use sonette_core::{KeyCode, UserInput};
use thiserror::Error;

/// Width the seek bar is given in command units, so positions read as percent
pub const SEEK_BAR_WIDTH: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward an input to the player
    Input(UserInput),
    /// Print the track list
    List,
    /// Print what is playing
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try \"help\")")]
    Unknown(String),

    #[error("{command} needs an argument")]
    MissingArgument { command: &'static str },

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),
}

pub const HELP: &str = "\
Commands:
  toggle            play or pause
  next | prev       skip forward or back
  select N          play track N from the list
  search [TEXT]     search the catalog (empty for the default query)
  seek PERCENT      jump to a point in the track
  grab PERCENT      press the seek handle
  move PERCENT      drag the seek handle
  release           let go of the seek handle
  key CODE          press a key, e.g. Space or ArrowRight
  list              show the track list
  status            show what is playing
  quit";

/// Parse one prompt line
///
/// # Errors
///
/// Returns an error describing why the line is not a command.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match name.to_ascii_lowercase().as_str() {
        "toggle" | "play" | "pause" => Command::Input(UserInput::PlayPauseButton),
        "next" | "n" => Command::Input(UserInput::NextButton),
        "prev" | "previous" | "p" => Command::Input(UserInput::PreviousButton),
        "select" | "s" => {
            let number = parse_number(required(rest, "select")?)?;
            let index = track_index(number).ok_or_else(|| CommandError::InvalidNumber(rest.into()))?;
            Command::Input(UserInput::TrackListItem(index))
        }
        "search" | "/" => Command::Input(UserInput::SearchText(rest.to_string())),
        "seek" => Command::Input(UserInput::SeekBarClick {
            x: parse_number(required(rest, "seek")?)?,
        }),
        "grab" => Command::Input(UserInput::SeekHandleDown {
            x: parse_number(required(rest, "grab")?)?,
        }),
        "move" => Command::Input(UserInput::PointerMove {
            x: parse_number(required(rest, "move")?)?,
        }),
        "release" => Command::Input(UserInput::PointerUp),
        "key" => {
            let name = required(rest, "key")?;
            let key = KeyCode::parse(name).ok_or_else(|| CommandError::UnknownKey(name.into()))?;
            Command::Input(UserInput::KeyDown(key))
        }
        "list" | "ls" => Command::List,
        "status" | "" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument { command })
    } else {
        Ok(rest)
    }
}

fn parse_number(value: &str) -> Result<f64, CommandError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| CommandError::InvalidNumber(value.into()))
}

/// Zero-based index for a one-based list number
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn track_index(number: f64) -> Option<usize> {
    if number < 1.0 || number.trunc() < number {
        return None;
    }
    Some(number as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_commands() {
        assert_eq!(parse("toggle"), Ok(Command::Input(UserInput::PlayPauseButton)));
        assert_eq!(parse("  NEXT "), Ok(Command::Input(UserInput::NextButton)));
        assert_eq!(parse("prev"), Ok(Command::Input(UserInput::PreviousButton)));
    }

    #[test]
    fn test_select_is_one_based() {
        assert_eq!(parse("select 3"), Ok(Command::Input(UserInput::TrackListItem(2))));
        assert_eq!(parse("select 0"), Err(CommandError::InvalidNumber("0".into())));
        assert_eq!(parse("select 1.5"), Err(CommandError::InvalidNumber("1.5".into())));
        assert_eq!(
            parse("select"),
            Err(CommandError::MissingArgument { command: "select" })
        );
    }

    #[test]
    fn test_search_keeps_inner_spacing() {
        assert_eq!(
            parse("search  miles  davis "),
            Ok(Command::Input(UserInput::SearchText("miles  davis".into())))
        );
        assert_eq!(parse("search"), Ok(Command::Input(UserInput::SearchText(String::new()))));
    }

    #[test]
    fn test_seek_commands() {
        assert_eq!(
            parse("seek 25"),
            Ok(Command::Input(UserInput::SeekBarClick { x: 25.0 }))
        );
        assert_eq!(
            parse("grab 10"),
            Ok(Command::Input(UserInput::SeekHandleDown { x: 10.0 }))
        );
        assert_eq!(parse("release"), Ok(Command::Input(UserInput::PointerUp)));
        assert_eq!(parse("seek abc"), Err(CommandError::InvalidNumber("abc".into())));
    }

    #[test]
    fn test_key_command() {
        assert_eq!(
            parse("key arrowright"),
            Ok(Command::Input(UserInput::KeyDown(KeyCode::ArrowRight)))
        );
        assert_eq!(parse("key F13"), Err(CommandError::UnknownKey("F13".into())));
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse(""), Ok(Command::Status));
        assert_eq!(parse("dance"), Err(CommandError::Unknown("dance".into())));
    }
}
