//! Per-instance debug-logging categories.
//!
//! Each category maps to a fixed `tracing` target so hosts and the
//! subscriber's `EnvFilter` can select them independently:
//!
//! | Category | Target        |
//! |----------|---------------|
//! | `FMI`    | `osmp::fmi`   |
//! | `OSMP`   | `osmp::osmp`  |
//! | `OSI`    | `osmp::osi`   |

use std::fmt;

/// Logging category known to the instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Host calls into the lifecycle/variable surface
    Fmi,
    /// Exchange-buffer handshake
    Osmp,
    /// Scene contents
    Osi,
}

impl LogCategory {
    pub const ALL: [LogCategory; 3] = [Self::Fmi, Self::Osmp, Self::Osi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fmi => "FMI",
            Self::Osmp => "OSMP",
            Self::Osi => "OSI",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    fn bit(&self) -> u8 {
        match self {
            Self::Fmi => 0b001,
            Self::Osmp => 0b010,
            Self::Osi => 0b100,
        }
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of enabled categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingCategories {
    bits: u8,
}

impl LoggingCategories {
    pub const NONE: Self = Self { bits: 0 };
    pub const ALL: Self = Self { bits: 0b111 };

    #[inline]
    pub fn enabled(&self, category: LogCategory) -> bool {
        self.bits & category.bit() != 0
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    /// Apply a host `set_debug_logging` request
    ///
    /// An empty name list toggles every category. Unknown names are ignored
    /// and returned so the caller can report them.
    pub fn apply<'a, S: AsRef<str>>(&mut self, logging_on: bool, names: &'a [S]) -> Vec<&'a str> {
        let mut unknown = Vec::new();
        if names.is_empty() {
            *self = if logging_on { Self::ALL } else { Self::NONE };
            return unknown;
        }
        for name in names {
            match LogCategory::parse(name.as_ref()) {
                Some(category) if logging_on => self.bits |= category.bit(),
                Some(category) => self.bits &= !category.bit(),
                None => unknown.push(name.as_ref()),
            }
        }
        unknown
    }
}
