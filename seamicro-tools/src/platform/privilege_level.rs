//! Privilege levels and the prompts that identify them.

use std::fmt;

/// Prompt strings announcing each privilege level.
///
/// Both are literal markers searched for in the byte stream, derived from
/// the chassis hostname alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    hostname: String,
    unprivileged: String,
    privileged: String,
}

impl PromptSpec {
    /// Build the prompts for a chassis hostname alias.
    pub fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            unprivileged: format!("{hostname}>"),
            privileged: format!("{hostname}#"),
        }
    }

    /// The hostname alias the prompts were built from.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Prompt shown before elevation (`<hostname>>`).
    pub fn unprivileged(&self) -> &str {
        &self.unprivileged
    }

    /// Prompt shown once elevated (`<hostname>#`).
    pub fn privileged(&self) -> &str {
        &self.privileged
    }

    /// Prompt for a given privilege level.
    pub fn for_level(&self, level: PrivilegeLevel) -> &str {
        match level {
            PrivilegeLevel::Unprivileged => self.unprivileged(),
            PrivilegeLevel::Privileged => self.privileged(),
        }
    }
}

/// A privilege level on the chassis CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeLevel {
    /// Login shell.
    Unprivileged,

    /// Shell after `enable`.
    Privileged,
}

impl fmt::Display for PrivilegeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivilegeLevel::Unprivileged => f.write_str("unprivileged"),
            PrivilegeLevel::Privileged => f.write_str("privileged"),
        }
    }
}
