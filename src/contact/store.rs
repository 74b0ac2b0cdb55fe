use directories::ProjectDirs;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use crate::contact::ContactError;
use crate::models::contact::ContactInfo;

pub const STORAGE_KEY: &str = "hubnexusai_user_info";

/// Device-local JSON file holding the collected contact, so collection
/// happens at most once per device.
#[derive(Debug, Clone)]
pub struct ContactStore {
    path: PathBuf,
}

impl ContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_path() -> Result<PathBuf, ContactError> {
        let proj = ProjectDirs::from("ai", "hubnexus", "HubNexusChat").ok_or(ContactError::NoDataDir)?;
        Ok(proj.data_dir().join(format!("{}.json", STORAGE_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<ContactInfo>, ContactError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => {
                return Err(e.into());
            }
        };
        let info: ContactInfo = serde_json::from_str(&raw)?;
        debug!("Loaded stored contact from {}", self.path.display());
        Ok(Some(info))
    }

    pub fn save(&self, info: &ContactInfo) -> Result<(), ContactError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(info)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_means_not_collected() {
        let dir = tempdir().expect("tempdir");
        let store = ContactStore::new(dir.path().join("none.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn saved_contact_is_loaded_back() {
        let dir = tempdir().expect("tempdir");
        let store = ContactStore::new(dir.path().join("nested").join("user.json"));
        let info = ContactInfo::new("Ana", "11999998888", "ana@example.com");
        store.save(&info).unwrap();
        assert_eq!(store.load().unwrap(), Some(info));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("user.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(ContactStore::new(path).load(), Err(ContactError::Json(_))));
    }
}
