use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

use crate::controls::PermissionState;
use crate::types::push::PushSubscription;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformState {
    #[serde(default)]
    pub permission: PermissionState,
    #[serde(default)]
    pub worker_script: Option<String>,
    #[serde(default)]
    pub application_server_key: Option<String>,
    #[serde(default)]
    pub subscription: Option<PushSubscription>,
}

impl PlatformState {
    // A missing file is an empty state.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err),
        };
        serde_json::from_str(&contents)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;
        std::fs::write(path, contents)
    }
}
