//! User directory lookup
//!
//! Parses the intranet user export:
//!
//! ```xml
//! <intranet>
//!   <server>
//!     <protocol>https</protocol>
//!     <host>intranet.example.com</host>
//!   </server>
//!   <users>
//!     <user id="10">
//!       <name>Maria K.</name>
//!       <avatar>/api/images/users/10</avatar>
//!     </user>
//!   </users>
//! </intranet>
//! ```
//!
//! Unlike the presence CSV there is no per-entry tolerance: a missing
//! `server` or `users` node, or a user without a name or avatar, fails the
//! whole document. The same holds for a document with more than one
//! `users` node, which is rejected as a duplicate field rather than resolved
//! to the first one.

use crate::error::{Error, Result};
use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DirectoryDocument {
    server: Option<ServerNode>,
    users: Option<UsersNode>,
}

#[derive(Debug, Deserialize)]
struct ServerNode {
    protocol: Option<String>,
    host: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UsersNode {
    #[serde(rename = "user", default)]
    users: Vec<UserNode>,
}

#[derive(Debug, Deserialize)]
struct UserNode {
    #[serde(rename = "@id")]
    id: String,
    name: Option<String>,
    avatar: Option<String>,
}

/// Display data for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub user_id: String,
    pub display_name: String,
    pub avatar_url: String,
}

/// User id -> directory entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    server_url: String,
    entries: BTreeMap<String, DirectoryEntry>,
}

impl Directory {
    /// Parse a directory document
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document: DirectoryDocument = quick_xml::de::from_str(xml)?;

        let server = document
            .server
            .ok_or_else(|| Error::Directory("missing <server> node".into()))?;
        let protocol = server
            .protocol
            .ok_or_else(|| Error::Directory("missing <server><protocol>".into()))?;
        let host = server
            .host
            .ok_or_else(|| Error::Directory("missing <server><host>".into()))?;
        let server_url = format!("{}://{}", protocol, host);

        let users = document
            .users
            .ok_or_else(|| Error::Directory("missing <users> node".into()))?;

        let mut entries = BTreeMap::new();
        for user in users.users {
            let display_name = user
                .name
                .ok_or_else(|| Error::Directory(format!("user {} has no <name>", user.id)))?;
            let avatar = user
                .avatar
                .ok_or_else(|| Error::Directory(format!("user {} has no <avatar>", user.id)))?;

            let entry = DirectoryEntry {
                avatar_url: format!("{}{}", server_url, avatar),
                user_id: user.id.clone(),
                display_name,
            };
            entries.insert(user.id, entry);
        }

        Ok(Self {
            server_url,
            entries,
        })
    }

    /// Read and parse a directory file
    pub fn from_file(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| Error::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_xml(&xml)?;

        tracing::info!(
            path = %path.display(),
            users = directory.len(),
            "Loaded user directory"
        );

        Ok(directory)
    }

    /// `protocol://host` prefix shared by all avatar URLs
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn get(&self, user_id: &str) -> Option<&DirectoryEntry> {
        self.entries.get(user_id)
    }

    /// Look up a user by the numeric id used in presence records
    pub fn get_user(&self, user_id: UserId) -> Option<&DirectoryEntry> {
        self.get(&user_id.to_string())
    }

    /// Entries ordered by id string
    pub fn iter(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
