//! Seamicro chassis platform definition.
//!
//! The chassis CLI shows `<hostname>>` after login and `<hostname>#` after
//! `enable`, which takes no secondary password. Output paging is turned off
//! per command with a `| nomore` pipe.

use crate::platform::{PlatformDefinition, PromptSpec};

/// Create the Seamicro platform definition for a chassis hostname alias.
pub fn platform(hostname: &str) -> PlatformDefinition {
    PlatformDefinition::new("seamicro", PromptSpec::new(hostname))
        .with_escalate("enable")
        .with_pager_suffix(" | nomore")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seamicro_platform() {
        let platform = platform("seamicro");
        assert_eq!(platform.name, "seamicro");
        assert_eq!(platform.escalate_command, "enable");
        assert_eq!(platform.prompts.unprivileged(), "seamicro>");
        assert_eq!(platform.prompts.privileged(), "seamicro#");
    }

    #[test]
    fn test_command_line_disables_pager() {
        let platform = platform("seamicro");
        assert_eq!(
            platform.command_line("show logging"),
            "show logging | nomore\n"
        );
    }
}
