//! Platform definition for device-specific CLI conventions.

use super::privilege_level::PromptSpec;

/// Platform definition containing the CLI conventions of a device family.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "seamicro").
    pub name: String,

    /// Prompts for each privilege level.
    pub prompts: PromptSpec,

    /// Command that moves from the unprivileged to the privileged level.
    pub escalate_command: String,

    /// Suffix appended to commands to disable the device pager.
    pub pager_suffix: String,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>, prompts: PromptSpec) -> Self {
        Self {
            name: name.into(),
            prompts,
            escalate_command: String::new(),
            pager_suffix: String::new(),
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    /// Set the escalation command.
    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = command.into();
        self
    }

    /// Set the pager-disabling suffix.
    pub fn with_pager_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.pager_suffix = suffix.into();
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Full line to send for `command`, pager suffix and newline included.
    pub fn command_line(&self, command: &str) -> String {
        format!("{}{}\n", command, self.pager_suffix)
    }
}
