use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{BadgrError, Result};

/// OAuth2 token pair as stored in the token file and returned by the token
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Credential {
    /// Parse a credential from JSON text, checking both tokens are non-empty.
    pub fn from_json(contents: &str) -> std::result::Result<Self, String> {
        let credential: Credential = serde_json::from_str(contents).map_err(|e| e.to_string())?;
        if credential.access_token.is_empty() {
            return Err("access_token is empty".to_string());
        }
        if credential.refresh_token.is_empty() {
            return Err("refresh_token is empty".to_string());
        }
        Ok(credential)
    }
}

/// Reads and writes the JSON token file.
pub struct CredentialStore;

impl CredentialStore {
    /// Load the credential from `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Credential> {
        if !path.exists() {
            return Err(BadgrError::CredentialFileNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let credential =
            Credential::from_json(&contents).map_err(|reason| BadgrError::CredentialParse {
                path: path.to_path_buf(),
                reason,
            })?;
        debug!(path = %path.display(), "Loaded token file");
        Ok(credential)
    }

    /// Replace the token file at `path` with `credential`.
    ///
    /// The new contents go to a temporary file next to `path`, which is then
    /// renamed over it, so a failed write leaves the previous token intact.
    pub fn save(path: &Path, credential: &Credential) -> Result<()> {
        let contents = serde_json::to_string(credential)
            .map_err(|e| BadgrError::ProtocolViolation(format!("Failed to encode token: {}", e)))?;

        // Same directory keeps the rename on one filesystem
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "Saved token file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credential {
        Credential {
            access_token: "FVQ__sample_token__QYzzRracgjH".into(),
            token_type: "Bearer".into(),
            refresh_token: "vK__sample_refresh_token__AlPZ".into(),
            expires_in: None,
            scope: None,
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        assert!(matches!(
            CredentialStore::load(&path),
            Err(BadgrError::CredentialFileNotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CredentialStore::load(&path),
            Err(BadgrError::CredentialParse { .. })
        ));
    }

    #[test]
    fn test_load_rejects_empty_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"access_token": "", "token_type": "Bearer", "refresh_token": "r"}"#,
        )
        .unwrap();
        match CredentialStore::load(&path) {
            Err(BadgrError::CredentialParse { reason, .. }) => {
                assert_eq!(reason, "access_token is empty")
            }
            other => panic!("expected CredentialParse, got {:?}", other),
        }
    }

    #[test]
    fn test_load_file_written_by_hand() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"access_token": "a", "token_type": "Bearer", "refresh_token": "r",
                "expires_in": 86400, "scope": "rw:profile rw:issuer rw:backpack"}"#,
        )
        .unwrap();
        let credential = CredentialStore::load(&path).unwrap();
        assert_eq!(credential.expires_in, Some(86400));
        assert_eq!(credential.scope.as_deref(), Some("rw:profile rw:issuer rw:backpack"));
    }

    #[test]
    fn test_load_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        CredentialStore::save(&path, &sample()).unwrap();

        let first = CredentialStore::load(&path).unwrap();
        CredentialStore::save(&path, &first).unwrap();
        let second = CredentialStore::load(&path).unwrap();

        assert_eq!(first, sample());
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        CredentialStore::save(&path, &sample()).unwrap();

        let mut newer = sample();
        newer.access_token = "fresh".into();
        newer.expires_in = Some(3600);
        CredentialStore::save(&path, &newer).unwrap();

        assert_eq!(CredentialStore::load(&path).unwrap(), newer);
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        CredentialStore::save(&path, &sample()).unwrap();
        CredentialStore::save(&path, &sample()).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("token.json")]);
    }

    #[test]
    fn test_failed_save_keeps_previous_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        CredentialStore::save(&path, &sample()).unwrap();

        // A directory cannot be replaced by the renamed file
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();
        let result = CredentialStore::save(&blocked, &sample());
        assert!(matches!(result, Err(BadgrError::Io(_))));

        assert_eq!(CredentialStore::load(&path).unwrap(), sample());
        assert!(blocked.join("keep").exists());
    }

    #[test]
    fn test_save_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("token.json");
        let result = CredentialStore::save(&path, &sample());
        assert!(matches!(result, Err(BadgrError::Io(_))));
        assert!(!path.exists());
    }
}
