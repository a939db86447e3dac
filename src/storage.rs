use crate::config::StorageBackend;
use crate::error::Result;
use crate::user::{seed_users, User};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

const USERS_FILE: &str = "users.json";

/// Ordered collection of registered users.
///
/// Implementations keep insertion order and never check ids for
/// uniqueness; that is up to the id generator.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;
    async fn insert_user(&self, user: User) -> Result<()>;
    /// Removes the first user with `id`, returning it if there was one.
    async fn remove_user(&self, id: &str) -> Result<Option<User>>;
}

#[derive(Default)]
pub struct MemoryStorage {
    users: Arc<RwLock<Vec<User>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub fn seeded() -> Self {
        Self::with_users(seed_users())
    }
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        self.users.write().await.push(user);
        Ok(())
    }

    async fn remove_user(&self, id: &str) -> Result<Option<User>> {
        let mut users = self.users.write().await;
        Ok(remove_first(&mut users, id))
    }
}

/// Users kept as a JSON array in `users.json` under a directory.
///
/// Every mutation rewrites the whole file; the mutex keeps concurrent
/// read-modify-write cycles from losing updates.
pub struct DiskStorage {
    base_path: PathBuf,
    lock: Mutex<()>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl DiskStorage {
    /// Opens the store at `path`, seeding it if no users file exists yet.
    pub async fn new(path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&path).await?;

        let storage = Self {
            base_path: path,
            lock: Mutex::new(()),
            _temp_dir: None,
        };
        storage.seed_if_missing().await?;
        Ok(storage)
    }

    pub async fn temp() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().to_path_buf();

        let storage = Self {
            base_path: path,
            lock: Mutex::new(()),
            _temp_dir: Some(temp_dir),
        };
        storage.seed_if_missing().await?;
        Ok(storage)
    }

    fn users_path(&self) -> PathBuf {
        self.base_path.join(USERS_FILE)
    }

    async fn seed_if_missing(&self) -> Result<()> {
        if !fs::try_exists(self.users_path()).await? {
            self.write_users(&seed_users()).await?;
        }
        Ok(())
    }

    async fn read_users(&self) -> Result<Vec<User>> {
        let data = fs::read(self.users_path()).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn write_users(&self, users: &[User]) -> Result<()> {
        let data = serde_json::to_vec_pretty(users)?;
        let tmp_path = self.base_path.join(format!("{USERS_FILE}.tmp"));
        fs::write(&tmp_path, &data).await?;
        fs::rename(&tmp_path, self.users_path()).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for DiskStorage {
    async fn list_users(&self) -> Result<Vec<User>> {
        let _guard = self.lock.lock().await;
        self.read_users().await
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_users().await?.into_iter().find(|u| u.id == id))
    }

    async fn insert_user(&self, user: User) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_users().await?;
        users.push(user);
        self.write_users(&users).await
    }

    async fn remove_user(&self, id: &str) -> Result<Option<User>> {
        let _guard = self.lock.lock().await;
        let mut users = self.read_users().await?;
        let removed = remove_first(&mut users, id);
        if removed.is_some() {
            self.write_users(&users).await?;
        }
        Ok(removed)
    }
}

fn remove_first(users: &mut Vec<User>, id: &str) -> Option<User> {
    let index = users.iter().position(|u| u.id == id)?;
    Some(users.remove(index))
}

/// Builds the store for `backend`, seeded with the sample users.
pub async fn create_storage(backend: &StorageBackend) -> Result<Arc<dyn UserStore>> {
    match backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::seeded())),
        StorageBackend::TempDir => Ok(Arc::new(DiskStorage::temp().await?)),
        StorageBackend::Directory(path) => Ok(Arc::new(DiskStorage::new(path.clone()).await?)),
    }
}
