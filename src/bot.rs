//! Automated peer command table
//!
//! A pure mapping from received chat lines to canned replies, used by the
//! client binary's bot mode. No IO and no concurrency; the caller feeds it
//! each line from the server and acts on the result.

use std::collections::HashMap;

/// Command that tells the bot to say goodbye and disconnect.
const EXIT_COMMAND: &str = "!EXIT";

/// Farewell sent before the bot disconnects.
const FAREWELL: &str = "Shutting down bot...";

/// What the bot should do with a received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotAction {
    /// Send this reply back to the server.
    Reply(String),
    /// Send this farewell, then disconnect.
    Farewell(String),
}

/// Command-to-reply table.
pub struct Responder {
    replies: HashMap<&'static str, &'static str>,
}

impl Responder {
    /// Build the table. Add entries here to teach the bot new commands.
    pub fn new() -> Self {
        let mut replies = HashMap::new();
        replies.insert("!smiley", ":-)");
        replies.insert("!square", "#####\n#...#\n#...#\n#...#\n#####");
        replies.insert("!huey", "You like Huey Lewis and the News?");
        replies.insert("!hello", "Hello there!");
        Self { replies }
    }

    /// Interpret one server line as a possible command.
    ///
    /// Broadcast lines look like `User0: !hello`; the candidate command is
    /// everything after the first `": "` and must match a table key
    /// exactly. Lines without the separator, and contents matching no
    /// command, produce no action.
    pub fn respond(&self, line: &str) -> Option<BotAction> {
        let (_, content) = line.split_once(": ")?;
        if content == EXIT_COMMAND {
            return Some(BotAction::Farewell(FAREWELL.to_string()));
        }
        self.replies
            .get(content)
            .map(|reply| BotAction::Reply((*reply).to_string()))
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new()
    }
}
