//! Tech support bundle generation.
//!
//! Runs each catalogue command against an elevated session and writes the
//! raw captured output to `<destination>/<key>[-<case>].txt`.

mod catalogue;

pub use catalogue::CommandCatalogue;

use std::path::{Component, Path, PathBuf};

use log::info;

use crate::channel::ShellIo;
use crate::driver::SessionDriver;
use crate::error::{BundleError, ChannelError, Result};
use crate::options::BundleOptions;

/// Path of the file holding the output for `key`.
///
/// `<prefix>/<key>.txt`, or `<prefix>/<key>-<case>.txt` when a non-empty
/// case id is given, lexically normalized.
pub fn compose_filename(prefix: &Path, key: &str, case: Option<&str>) -> PathBuf {
    let name = match case.filter(|c| !c.is_empty()) {
        Some(case) => format!("{key}-{case}.txt"),
        None => format!("{key}.txt"),
    };
    normalize(&prefix.join(name))
}

/// Fold `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}

/// A file written into the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    /// Catalogue key.
    pub key: String,

    /// Where the output was written.
    pub path: PathBuf,

    /// Bytes written.
    pub bytes: usize,
}

/// Summary of a bundle run.
#[derive(Debug, Clone, Default)]
pub struct BundleReport {
    /// Files written, in the order they were produced.
    pub files: Vec<BundleFile>,
}

/// A tech support bundle job.
#[derive(Debug, Clone)]
pub struct TechSupportBundle {
    output_dir: PathBuf,
    case: Option<String>,
    catalogue: CommandCatalogue,
}

impl TechSupportBundle {
    /// Plan a bundle from the action's options.
    pub fn new(options: &BundleOptions) -> Self {
        Self {
            output_dir: options.output_dir().to_path_buf(),
            case: options.case().map(str::to_string),
            catalogue: CommandCatalogue::new(options.extended),
        }
    }

    /// Commands this bundle will run.
    pub fn catalogue(&self) -> &CommandCatalogue {
        &self.catalogue
    }

    /// Output path for a catalogue key.
    pub fn filename(&self, key: &str) -> PathBuf {
        compose_filename(&self.output_dir, key, self.case.as_deref())
    }

    /// Capture every catalogue command into its file.
    ///
    /// Stops with [`ChannelError::Cancelled`] as soon as the session is
    /// interrupted; files already written stay in place and no file is
    /// created for an unfinished command.
    pub async fn run<S: ShellIo>(&self, session: &mut SessionDriver<S>) -> Result<BundleReport> {
        let mut report = BundleReport::default();

        for (key, command) in self.catalogue.iter() {
            if !session.is_running() {
                return Err(ChannelError::Cancelled.into());
            }

            let path = self.filename(key);
            info!("Processing {}, writing to {}", key, path.display());

            let response = session.send_command(command).await?;
            if !response.is_empty() {
                tokio::fs::write(&path, &response.raw_result)
                    .await
                    .map_err(|source| BundleError::Write {
                        path: path.clone(),
                        source,
                    })?;
                report.files.push(BundleFile {
                    key: key.to_string(),
                    path,
                    bytes: response.raw_result.len(),
                });
            }

            info!("Completed {}", key);
        }

        Ok(report)
    }
}
