//! Local path to remote document name translation

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::errors::DeployerError;

/// Path separators rewritten to the server's package separator
const SEPARATORS: [char; 2] = ['/', '\\'];

/// Name of a document on the IRIS server, e.g. `pkg.sub.MyClass.cls`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteDocumentId(String);

impl RemoteDocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteDocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteDocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Translate a local path into the remote document name.
///
/// Removes one leading occurrence of `source_root` (exact string match) and
/// turns every remaining path separator into `.`. The caller must use the same
/// separator convention for `local_path` and `source_root`.
pub fn translate(local_path: &str, source_root: &str) -> RemoteDocumentId {
    let relative = if source_root.is_empty() {
        local_path
    } else {
        local_path.strip_prefix(source_root).unwrap_or(local_path)
    };

    RemoteDocumentId(relative.replace(SEPARATORS, "."))
}

/// Translate a whole file list.
///
/// Repeated paths are kept once. Two distinct paths that map to the same
/// document name are rejected since one upload would silently replace the other.
pub fn translate_all(
    paths: &[String],
    source_root: &str,
) -> Result<Vec<(String, RemoteDocumentId)>, DeployerError> {
    let mut seen: HashMap<RemoteDocumentId, &str> = HashMap::new();
    let mut translated = Vec::with_capacity(paths.len());

    for path in paths {
        let id = translate(path, source_root);
        match seen.get(&id) {
            Some(previous) if *previous == path.as_str() => {
                warn!("Skipping duplicate entry for {}", path);
            }
            Some(previous) => {
                return Err(DeployerError::ConfigError(format!(
                    "'{}' and '{}' both map to document '{}'",
                    previous, path, id
                )));
            }
            None => {
                seen.insert(id.clone(), path.as_str());
                translated.push((path.clone(), id));
            }
        }
    }

    Ok(translated)
}
