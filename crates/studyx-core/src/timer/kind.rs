use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of timed interval. Stored as `sessionType` on study sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    #[default]
    Focus,
    Break,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::Break => "break",
        }
    }

    /// The kind the timer switches to after this one completes.
    pub fn opposite(&self) -> Self {
        match self {
            SessionKind::Focus => SessionKind::Break,
            SessionKind::Break => SessionKind::Focus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus Session",
            SessionKind::Break => "Break Time",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "focus" => Ok(SessionKind::Focus),
            "break" => Ok(SessionKind::Break),
            other => Err(format!("unknown session type: {other}")),
        }
    }
}

/// Full (nominal) length of each kind, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Durations {
    pub focus_min: u64,
    pub break_min: u64,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            focus_min: 25,
            break_min: 5,
        }
    }
}

impl Durations {
    pub fn minutes(&self, kind: SessionKind) -> u64 {
        match kind {
            SessionKind::Focus => self.focus_min,
            SessionKind::Break => self.break_min,
        }
    }

    /// Duration in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn ms(&self, kind: SessionKind) -> u64 {
        self.minutes(kind).saturating_mul(60).saturating_mul(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5() {
        let d = Durations::default();
        assert_eq!(d.ms(SessionKind::Focus), 25 * 60 * 1000);
        assert_eq!(d.ms(SessionKind::Break), 5 * 60 * 1000);
    }

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!("focus".parse::<SessionKind>(), Ok(SessionKind::Focus));
        assert_eq!("break".parse::<SessionKind>(), Ok(SessionKind::Break));
        assert!("nap".parse::<SessionKind>().is_err());
        assert_eq!(SessionKind::Focus.opposite(), SessionKind::Break);
    }
}
