//! Suffix tags for classifying log lines
//!
//! `Tag::ConfigError.apply("bad port")` gives `bad port type=config.error`, so
//! log search can pick out config and HTTP problems by a fixed marker.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    ConfigError,
    HttpError,
    HttpWarn,
    HttpInfo,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::ConfigError => "type=config.error",
            Tag::HttpError => "type=http.error",
            Tag::HttpWarn => "type=http.warn",
            Tag::HttpInfo => "type=http.info",
        }
    }

    /// Append this tag to a message
    pub fn apply(&self, message: impl fmt::Display) -> String {
        format!("{} {}", message, self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
