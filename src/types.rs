use std::fmt::{self, Display};
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Tag describing what kind of traffic a request models.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Html,
    Api,
    Login,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Api => "api",
            Self::Login => "login",
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "api" => Ok(Self::Api),
            "login" | "login-attempt" => Ok(Self::Login),
            other => Err(format!("unknown request kind: {other}")),
        }
    }
}

/// One unit of work. Built by the producer, pulled off the bucket by a
/// worker, then discarded. Never mutated in between.
#[derive(Clone, Debug)]
pub struct Request {
    pub kind: RequestKind,
    pub arrived_at: Instant,
}

impl Request {
    #[must_use]
    pub fn new(kind: RequestKind) -> Self {
        Self {
            kind,
            arrived_at: Instant::now(),
        }
    }

    /// Time spent in the queue (and in flight) since arrival.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.arrived_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::RequestKind;
    use std::str::FromStr;

    #[test]
    fn request_kind_round_trips() {
        for kind in [RequestKind::Html, RequestKind::Api, RequestKind::Login] {
            let parsed = RequestKind::from_str(kind.as_str());
            assert_eq!(parsed, Ok(kind));
        }
    }

    #[test]
    fn request_kind_accepts_aliases() {
        assert_eq!(
            RequestKind::from_str("Login-Attempt"),
            Ok(RequestKind::Login)
        );
        assert!(RequestKind::from_str("ftp").is_err());
    }
}
