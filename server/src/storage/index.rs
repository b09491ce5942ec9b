use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-environment bookkeeping: which versions exist and which one is current.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionIndex {
    pub current: String,
    pub versions: Vec<VersionEntry>,
    /// Highest version number ever handed out, so deleted uids are never reused
    #[serde(default)]
    pub last_assigned: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub uid: String,
    pub created_at: DateTime<Utc>,
}

impl VersionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next uid, record it, and make it current.
    pub fn push_next(&mut self) -> String {
        let number = self.next_version_number();
        let uid = format!("v{number}");
        self.last_assigned = number;
        self.versions.push(VersionEntry {
            uid: uid.clone(),
            created_at: Utc::now(),
        });
        self.current.clone_from(&uid);
        uid
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.versions.iter().any(|v| v.uid == uid)
    }

    /// Drop one version. If it was current, the newest remaining one takes over.
    /// Returns false when the uid is unknown.
    pub fn remove(&mut self, uid: &str) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v.uid != uid);
        if self.versions.len() == before {
            return false;
        }

        if self.current == uid {
            self.current = self
                .versions
                .last()
                .map(|v| v.uid.clone())
                .unwrap_or_default();
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn next_version_number(&self) -> u32 {
        self.versions
            .iter()
            .filter_map(|v| v.uid.strip_prefix('v').and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0)
            .max(self.last_assigned)
            + 1
    }
}
