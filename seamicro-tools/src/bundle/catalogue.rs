//! The diagnostic commands that make up a tech support bundle.

use indexmap::IndexMap;

/// Commands always captured.
const BASE_COMMANDS: &[(&str, &str)] = &[
    ("tech-support-detail", "show tech-support detail"),
    ("logging", "show logging"),
    ("console", "show console"),
];

/// Additional commands captured with `--extended`.
const EXTENDED_COMMANDS: &[(&str, &str)] = &[
    ("chassis", "show chassis"),
    ("version", "show version details"),
    ("storage-disk", "show storage disk brief"),
    ("storage-pool", "show storage pool brief"),
    ("storage-volume", "show storage volume brief"),
    ("storage-assign", "show storage assign brief"),
];

/// Ordered mapping of file key to the command whose output it holds.
#[derive(Debug, Clone)]
pub struct CommandCatalogue {
    commands: IndexMap<&'static str, &'static str>,
}

impl CommandCatalogue {
    /// Build the catalogue, including the extended set when asked.
    pub fn new(extended: bool) -> Self {
        let mut commands: IndexMap<&'static str, &'static str> =
            BASE_COMMANDS.iter().copied().collect();
        if extended {
            commands.extend(EXTENDED_COMMANDS.iter().copied());
        }
        Self { commands }
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Command text for a key.
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.commands.get(key).copied()
    }

    /// Iterate `(key, command)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.commands.iter().map(|(k, v)| (*k, *v))
    }
}
