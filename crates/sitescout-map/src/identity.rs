//! Read-only access to the signed-in user.

use std::path::{Path, PathBuf};

use sitescout_core::Identity;

/// Supplies the current user, if any. The map flow never writes identities.
pub trait IdentitySource: Send + Sync {
    fn current(&self) -> Option<Identity>;
}

/// Reads a persisted session object (`{"email": "...", ...}`) on every call.
///
/// A missing or unreadable file, empty content, content containing
/// `undefined` anywhere, or a blank email all mean "nobody is signed in".
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentitySource for FileIdentityStore {
    fn current(&self) -> Option<Identity> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read session file");
                return None;
            }
        };
        parse_session(&raw)
    }
}

fn parse_session(raw: &str) -> Option<Identity> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" || raw.contains("undefined") {
        return None;
    }
    match serde_json::from_str::<Identity>(raw) {
        Ok(identity) => {
            let email = identity.email.trim();
            if email.is_empty() {
                None
            } else {
                Some(Identity::new(email))
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed session file");
            None
        }
    }
}

/// A fixed identity, for embedding hosts that already know the user.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<Identity>);

impl StaticIdentity {
    #[must_use]
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self(Some(Identity::new(email)))
    }
}

impl IdentitySource for StaticIdentity {
    fn current(&self) -> Option<Identity> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn store_with(content: &str) -> (tempfile::NamedTempFile, FileIdentityStore) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let store = FileIdentityStore::new(file.path());
        (file, store)
    }

    #[test]
    fn reads_email_from_session_object() {
        let (_file, store) = store_with(r#"{"email": "a@b.com", "displayName": "A"}"#);
        assert_eq!(store.current(), Some(Identity::new("a@b.com")));
    }

    #[test]
    fn rereads_file_on_each_call() {
        let (file, store) = store_with(r#"{"email": "a@b.com"}"#);
        std::fs::write(file.path(), r#"{"email": "c@d.com"}"#).unwrap();
        assert_eq!(store.current(), Some(Identity::new("c@d.com")));
    }

    #[test]
    fn missing_file_means_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("session.json"));
        assert_eq!(store.current(), None);
    }

    #[test]
    fn undefined_and_empty_content_mean_signed_out() {
        for content in [
            "",
            "   \n",
            "undefined",
            "null",
            r#"{"email": ""}"#,
            r#"{"email": "undefined"}"#,
            r#"{"email": "a@b.com", "token": "undefined"}"#,
            "{not json",
        ] {
            let (_file, store) = store_with(content);
            assert_eq!(store.current(), None, "content {content:?}");
        }
    }

    #[test]
    fn static_identity_returns_its_value() {
        assert_eq!(
            StaticIdentity::signed_in("a@b.com").current(),
            Some(Identity::new("a@b.com"))
        );
        assert_eq!(StaticIdentity::default().current(), None);
    }
}
