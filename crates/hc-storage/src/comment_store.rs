//! File system storage for comments
//!
//! Each owner gets one JSON file under `comments/`, named after
//! [`OwnerRef::storage_key`]. Writes go through a temp file and a rename.

use hc_core::comment::{sort_by_recency, Comment, CommentScope, Identity};
use hc_core::error::{HasCommentsError, Result};
use hc_core::store::CommentStore;
use hc_core::types::{CommentId, OwnerRef};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Current on-disk format version
pub const CURRENT_SCHEMA_VERSION: &str = "1.0";

/// What a directory scan does with an owner file it cannot read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unreadable {
    /// Log and leave it out
    Skip,
    /// Fail the whole scan
    Fail,
}

/// Contents of one owner file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerFile {
    pub schema_version: String,
    pub owner: OwnerRef,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl OwnerFile {
    fn new(owner: OwnerRef) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            owner,
            comments: Vec::new(),
        }
    }
}

/// File system based comment storage
pub struct FileSystemStore {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Comments subdirectory
    comments_dir: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileSystemStore {
    /// Create a new file system store
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let comments_dir = base_dir.join("comments");

        let store = Self {
            base_dir,
            comments_dir,
            write_lock: Mutex::new(()),
        };

        store.ensure_dirs()?;
        Ok(store)
    }

    /// Create storage in the platform data directory (~/.has-comments fallback)
    pub fn default_location() -> Result<Self> {
        let base_dir = directories::ProjectDirs::from("com", "has-comments", "has-comments")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".has-comments")
            });

        Self::new(base_dir)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.comments_dir.exists() {
            fs::create_dir_all(&self.comments_dir).map_err(|e| {
                HasCommentsError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create comments directory: {}", e),
                ))
            })?;
            debug!("Created comments directory: {:?}", self.comments_dir);
        }
        Ok(())
    }

    /// Get the path for an owner file
    fn owner_path(&self, owner: &OwnerRef) -> PathBuf {
        self.comments_dir.join(format!("{}.json", owner.storage_key()))
    }

    /// Get a temporary path for atomic writes
    fn temp_path(&self, owner: &OwnerRef) -> PathBuf {
        self.comments_dir
            .join(format!(".{}.json.tmp", owner.storage_key()))
    }

    /// Write an owner file atomically (write to temp, then rename)
    fn atomic_write(&self, file: &OwnerFile) -> Result<()> {
        let temp_path = self.temp_path(&file.owner);
        let final_path = self.owner_path(&file.owner);

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            HasCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, file)?;
        writer.flush()?;

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            HasCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Saved comments of {} to {:?}", file.owner, final_path);
        Ok(())
    }

    /// Read an owner file
    fn read_file(&self, path: &Path) -> Result<OwnerFile> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let owner_file: OwnerFile = serde_json::from_reader(reader)?;

        if owner_file.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(HasCommentsError::Storage(format!(
                "Unsupported schema version {} in {:?}",
                owner_file.schema_version, path
            )));
        }
        Ok(owner_file)
    }

    /// Read an owner's file, or an empty one if it has no comments yet
    fn load_owner(&self, owner: &OwnerRef) -> Result<OwnerFile> {
        let path = self.owner_path(owner);
        if !path.exists() {
            return Ok(OwnerFile::new(owner.clone()));
        }
        self.read_file(&path)
    }

    /// All owner files, skipping temp files
    fn all_files(&self, unreadable: Unreadable) -> Result<Vec<OwnerFile>> {
        let entries = fs::read_dir(&self.comments_dir).map_err(|e| {
            HasCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read comments directory: {}", e),
            ))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match self.read_file(&path) {
                Ok(file) => files.push(file),
                Err(e) if unreadable == Unreadable::Skip => {
                    warn!("Failed to read comment file {:?}: {}", path, e)
                }
                Err(e) => {
                    return Err(e.with_context(format!("Failed to read comment file {:?}", path)))
                }
            }
        }

        Ok(files)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| HasCommentsError::Storage("comment store lock poisoned".to_string()))
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get comments directory
    pub fn comments_dir(&self) -> &PathBuf {
        &self.comments_dir
    }

    /// Every readable comment across all owners; unreadable files are logged
    pub fn all_comments(&self) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .all_files(Unreadable::Skip)?
            .into_iter()
            .flat_map(|file| file.comments)
            .collect();
        sort_by_recency(&mut comments);
        Ok(comments)
    }
}

impl CommentStore for FileSystemStore {
    fn insert(&self, comment: &Comment) -> Result<CommentId> {
        let _guard = self.lock()?;
        let mut file = self.load_owner(&comment.owner)?;

        if file.comments.iter().any(|c| c.id == comment.id) {
            return Err(HasCommentsError::Storage(format!(
                "Comment with ID {} already exists",
                comment.id
            )));
        }

        file.comments.push(comment.clone());
        self.atomic_write(&file)?;
        Ok(comment.id.clone())
    }

    fn update(&self, comment: &Comment) -> Result<()> {
        let _guard = self.lock()?;
        let mut file = self.load_owner(&comment.owner)?;

        let slot = file
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| HasCommentsError::CommentNotFound(comment.id.to_string()))?;
        *slot = comment.clone();

        self.atomic_write(&file)
    }

    fn get(&self, id: &CommentId) -> Result<Comment> {
        self.all_files(Unreadable::Fail)?
            .into_iter()
            .flat_map(|file| file.comments)
            .find(|c| &c.id == id)
            .ok_or_else(|| HasCommentsError::CommentNotFound(id.to_string()))
    }

    fn exists_with_identity(&self, identity: &Identity) -> Result<bool> {
        Ok(self
            .all_files(Unreadable::Fail)?
            .iter()
            .any(|file| file.comments.iter().any(|c| identity.matches(c))))
    }

    fn list_for_owner(&self, owner: &OwnerRef, scope: CommentScope) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .load_owner(owner)?
            .comments
            .into_iter()
            .filter(|c| scope.includes(c))
            .collect();
        sort_by_recency(&mut comments);
        Ok(comments)
    }

    fn delete_for_owner(&self, owner: &OwnerRef) -> Result<usize> {
        let _guard = self.lock()?;
        let path = self.owner_path(owner);
        if !path.exists() {
            return Ok(0);
        }

        let removed = self.read_file(&path)?.comments.len();
        fs::remove_file(&path).map_err(|e| {
            HasCommentsError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to delete comment file: {}", e),
            ))
        })?;

        debug!("Deleted {} comments of {} from {:?}", removed, owner, path);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::comment::CommentBuilder;
    use hc_core::types::UserId;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_store() -> (FileSystemStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSystemStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn create_test_comment(owner: &OwnerRef, user: u64) -> Comment {
        CommentBuilder::new(owner.clone())
            .body("Test body")
            .user_id(UserId(user))
            .build()
    }

    #[test]
    fn test_store_creation() {
        let (store, _temp) = create_test_store();
        assert!(store.comments_dir().exists());
    }

    #[test]
    fn test_owner_path() {
        let (store, _temp) = create_test_store();
        let owner = OwnerRef::new("Post", 1);

        let path = store.owner_path(&owner);
        assert!(path.to_string_lossy().ends_with(".json"));
        assert!(path.to_string_lossy().contains(&owner.storage_key()));
    }

    #[test]
    fn test_insert_and_get() {
        let (store, _temp) = create_test_store();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 1);

        let id = store.insert(&comment).unwrap();
        assert!(store.exists(&id));
        assert_eq!(store.get(&id).unwrap(), comment);
    }

    #[test]
    fn test_get_nonexistent() {
        let (store, _temp) = create_test_store();
        let result = store.get(&CommentId::new());
        assert!(matches!(result, Err(HasCommentsError::CommentNotFound(_))));
    }

    #[test]
    fn test_duplicate_insert_fails() {
        let (store, _temp) = create_test_store();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 1);
        store.insert(&comment).unwrap();
        assert!(store.insert(&comment).is_err());
    }

    #[test]
    fn test_update() {
        let (store, _temp) = create_test_store();
        let mut comment = create_test_comment(&OwnerRef::new("Post", 1), 1);
        store.insert(&comment).unwrap();

        comment.approve();
        store.update(&comment).unwrap();

        assert!(store.get(&comment.id).unwrap().is_approved());
        assert_eq!(store.count_approved_for_owner(&comment.owner).unwrap(), 1);
    }

    #[test]
    fn test_update_nonexistent() {
        let (store, _temp) = create_test_store();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 1);
        assert!(store.update(&comment).is_err());
    }

    #[test]
    fn test_list_scopes_and_order() {
        let (store, _temp) = create_test_store();
        let post = OwnerRef::new("Post", 1);

        let first = create_test_comment(&post, 1);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut second = create_test_comment(&post, 2);
        second.approve();

        store.insert(&first).unwrap();
        store.insert(&second).unwrap();
        store
            .insert(&create_test_comment(&OwnerRef::new("Page", 1), 3))
            .unwrap();

        let all = store.list_for_owner(&post, CommentScope::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);

        let pending = store.list_for_owner(&post, CommentScope::Pending).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, first.id);

        assert_eq!(store.all_comments().unwrap().len(), 3);
    }

    #[test]
    fn test_identity_lookup_across_owners() {
        let (store, _temp) = create_test_store();
        store
            .insert(&create_test_comment(&OwnerRef::new("Page", 9), 7))
            .unwrap();

        assert!(store
            .exists_with_identity(&Identity::Registered(UserId(7)))
            .unwrap());
        assert!(!store
            .exists_with_identity(&Identity::Registered(UserId(8)))
            .unwrap());
    }

    #[test]
    fn test_delete_for_owner() {
        let (store, _temp) = create_test_store();
        let post = OwnerRef::new("Post", 1);
        store.insert(&create_test_comment(&post, 1)).unwrap();
        store.insert(&create_test_comment(&post, 2)).unwrap();

        assert_eq!(store.delete_for_owner(&post).unwrap(), 2);
        assert_eq!(store.count_for_owner(&post).unwrap(), 0);
        assert_eq!(store.delete_for_owner(&post).unwrap(), 0);
    }

    #[test]
    fn test_atomic_write() {
        let (store, _temp) = create_test_store();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 1);
        store.insert(&comment).unwrap();

        assert!(!store.temp_path(&comment.owner).exists());

        let final_path = store.owner_path(&comment.owner);
        let content = fs::read_to_string(&final_path).unwrap();
        assert!(content.contains("schema_version"));
        assert!(content.contains(&comment.id.to_string()));
    }

    #[test]
    fn test_ignores_temp_and_non_json_files() {
        let (store, _temp) = create_test_store();
        fs::write(store.comments_dir().join(".temp.json.tmp"), "{}").unwrap();
        fs::write(store.comments_dir().join("readme.txt"), "test").unwrap();

        assert!(store.all_comments().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_fails_lookups() {
        let (store, _temp) = create_test_store();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 7);
        store.insert(&comment).unwrap();
        fs::write(store.comments_dir().join("o_broken.json"), "{not json").unwrap();

        assert!(store
            .exists_with_identity(&Identity::Registered(UserId(7)))
            .is_err());
        assert!(store.get(&comment.id).is_err());

        let listed = store.all_comments().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, comment.id);
    }

    #[test]
    fn test_rejects_unknown_schema_version() {
        let (store, _temp) = create_test_store();
        let owner = OwnerRef::new("Post", 1);
        let file = OwnerFile {
            schema_version: "9.9".to_string(),
            owner: owner.clone(),
            comments: Vec::new(),
        };
        fs::write(store.owner_path(&owner), serde_json::to_string(&file).unwrap()).unwrap();

        assert!(matches!(
            store.list_for_owner(&owner, CommentScope::All),
            Err(HasCommentsError::Storage(_))
        ));
    }

    #[test]
    fn test_reopen_keeps_comments() {
        let temp_dir = TempDir::new().unwrap();
        let comment = create_test_comment(&OwnerRef::new("Post", 1), 1);
        FileSystemStore::new(temp_dir.path())
            .unwrap()
            .insert(&comment)
            .unwrap();

        let reopened = FileSystemStore::new(temp_dir.path()).unwrap();
        assert_eq!(reopened.get(&comment.id).unwrap(), comment);
    }
}
