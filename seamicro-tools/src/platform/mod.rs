//! Platform definitions for device CLI conventions.
//!
//! This module defines the device-specific pieces the session driver needs:
//! prompt strings per privilege level, the elevation command and the pager
//! suffix.

mod definition;
mod privilege_level;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::{PrivilegeLevel, PromptSpec};
