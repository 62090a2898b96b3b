use serde::{Deserialize, Serialize};

use crate::error::{FixdeskError, Result};

pub const DEFAULT_STAFF: [&str; 4] = ["Beni", "Avi", "Moishe", "Yosef"];
pub const DEFAULT_PASSCODE: &str = "YU2025";

/// Ordered list of workers tickets can be assigned to.
///
/// Tickets refer to workers by name only, so removing someone here leaves
/// their existing assignments alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffRoster(Vec<String>);

impl StaffRoster {
    /// Builds a roster, trimming names and dropping blanks and repeats
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut roster: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !roster.contains(&name) {
                roster.push(name);
            }
        }
        Self(roster)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StaffRoster {
    fn default() -> Self {
        Self::new(DEFAULT_STAFF)
    }
}

/// Admin passcode gating the staff dashboard.
///
/// This is a convenience gate for a shared front-desk screen, compared
/// verbatim and stored as entered. It carries no trust guarantees.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdminPasscode(String);

impl AdminPasscode {
    pub fn new(passcode: impl Into<String>) -> Result<Self> {
        let passcode = passcode.into();
        if passcode.trim().is_empty() {
            return Err(FixdeskError::validation("passcode", "passcode cannot be empty"));
        }
        Ok(Self(passcode))
    }

    pub fn matches(&self, input: &str) -> bool {
        self.0 == input
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AdminPasscode {
    type Error = FixdeskError;

    fn try_from(passcode: String) -> Result<Self> {
        Self::new(passcode)
    }
}

impl From<AdminPasscode> for String {
    fn from(passcode: AdminPasscode) -> Self {
        passcode.0
    }
}

impl Default for AdminPasscode {
    fn default() -> Self {
        Self(DEFAULT_PASSCODE.to_string())
    }
}

// Keep the passcode out of debug logs
impl std::fmt::Debug for AdminPasscode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminPasscode(***)")
    }
}
