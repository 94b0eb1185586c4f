//! Line-oriented transport commands read from stdin

use crate::error::CliError;
use std::str::FromStr;
use std::time::Duration;

/// Longest virtual time a single `tick` may advance
pub const MAX_TICK: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    /// Activate the track at this index
    Select(usize),
    Repeat,
    Volume(f32),
    Scrub(f64),
    DragStart,
    Drag(f64),
    DragEnd,
    /// Advance the virtual clock
    Tick(Duration),
    State,
    Quit,
}

impl FromStr for Command {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CliError::Command("empty command".to_string()));
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(CliError::Command(format!("too many arguments to '{}'", name)));
        }

        let command = match (name.to_ascii_lowercase().as_str(), arg) {
            ("play", None) => Command::Play,
            ("pause", None) => Command::Pause,
            ("toggle", None) => Command::Toggle,
            ("next", None) => Command::Next,
            ("prev" | "previous", None) => Command::Previous,
            ("select", Some(arg)) => Command::Select(parse_arg(name, arg)?),
            ("repeat", None) => Command::Repeat,
            ("volume", Some(arg)) => Command::Volume(parse_arg(name, arg)?),
            ("scrub", Some(arg)) => Command::Scrub(parse_arg(name, arg)?),
            ("drag-start", None) => Command::DragStart,
            ("drag", Some(arg)) => Command::Drag(parse_arg(name, arg)?),
            ("drag-end", None) => Command::DragEnd,
            ("tick", Some(arg)) => {
                let seconds: f64 = parse_arg(name, arg)?;
                match Duration::try_from_secs_f64(seconds) {
                    Ok(duration) if duration <= MAX_TICK => Command::Tick(duration),
                    _ => {
                        return Err(CliError::Command(format!(
                            "tick needs between 0 and {} seconds, got '{}'",
                            MAX_TICK.as_secs(),
                            arg
                        )));
                    }
                }
            }
            ("state", None) => Command::State,
            ("quit" | "exit", None) => Command::Quit,
            ("select" | "volume" | "scrub" | "drag" | "tick", None) => {
                return Err(CliError::Command(format!("'{}' needs an argument", name)));
            }
            (_, Some(_)) if is_known(name) => {
                return Err(CliError::Command(format!("'{}' takes no argument", name)));
            }
            _ => return Err(CliError::Command(format!("unknown command '{}'", name))),
        };

        Ok(command)
    }
}

fn is_known(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "play" | "pause" | "toggle" | "next" | "prev" | "previous" | "repeat" | "drag-start"
            | "drag-end" | "state" | "quit" | "exit"
    )
}

fn parse_arg<T: FromStr>(name: &str, arg: &str) -> Result<T, CliError> {
    arg.parse()
        .map_err(|_| CliError::Command(format!("invalid argument '{}' for '{}'", arg, name)))
}
