//! Dispatcher - recognizes addressed chat lines and routes commands.

use crate::commands::Command;

/// Where a parsed command goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Run now, outside the queue
    Immediate,
    /// Enqueue at the head
    Priority,
    /// Enqueue at the tail
    Queued,
}

/// Dispatcher routes chat lines addressed to the bot.
pub struct Dispatcher {
    username: String,
}

impl Dispatcher {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Strip the `<botname>` prefix and parse the rest.
    ///
    /// Returns `None` when the line is not addressed to the bot or the
    /// command is not recognized.
    pub fn parse(&self, message: &str) -> Option<Command> {
        let message = message.trim();
        let (first, rest) = message
            .split_once(char::is_whitespace)
            .unwrap_or((message, ""));
        if !first.eq_ignore_ascii_case(&self.username) {
            return None;
        }
        Command::parse(rest)
    }

    /// Select the route for a command
    pub fn route(&self, command: &Command) -> Route {
        match command {
            Command::QueueStatus
            | Command::QueueClear
            | Command::QueuePause
            | Command::QueueResume
            | Command::Status
            | Command::StatusFull
            | Command::Threats
            | Command::SelfDefenseStatus
            | Command::CheckFood
            | Command::DebugSurvival
            | Command::Stop => Route::Immediate,
            c if c.is_stop() => Route::Priority,
            _ => Route::Queued,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_addressed_lines_parse() {
        let dispatcher = Dispatcher::new("Minebot");
        assert_eq!(dispatcher.parse("minebot come"), Some(Command::Come));
        assert_eq!(dispatcher.parse("  MINEBOT   gather wood "), Some(Command::GatherWood));
        assert_eq!(dispatcher.parse("otherbot come"), None);
        assert_eq!(dispatcher.parse("minebot"), None);
        assert_eq!(dispatcher.parse("minebot dance"), None);
        assert_eq!(dispatcher.parse("minebotcome"), None);
    }

    #[test]
    fn routing() {
        let dispatcher = Dispatcher::new("minebot");
        assert_eq!(dispatcher.route(&Command::Stop), Route::Immediate);
        assert_eq!(dispatcher.route(&Command::QueuePause), Route::Immediate);
        assert_eq!(dispatcher.route(&Command::Threats), Route::Immediate);
        assert_eq!(dispatcher.route(&Command::DebugSurvival), Route::Immediate);
        assert_eq!(dispatcher.route(&Command::FarmOff), Route::Priority);
        assert_eq!(dispatcher.route(&Command::GuardStop), Route::Priority);
        assert_eq!(dispatcher.route(&Command::GatherWood), Route::Queued);
        assert_eq!(dispatcher.route(&Command::Inventory), Route::Queued);
        assert_eq!(dispatcher.route(&Command::Sleep), Route::Queued);
    }
}
