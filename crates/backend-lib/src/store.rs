// ============================
// tripmate-backend-lib/src/store.rs
// ============================
//! Trip/user store abstraction with a flat-file implementation.
//!
//! The store is deliberately dumb: key lookups and inserts on two tables,
//! no validation of what goes in. Joining a trip checks existence only and
//! records no membership, so there is no durable participant list anywhere.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::RwLock};

use crate::error::AppError;

/// Every created trip gets this name, whatever the caller sent.
pub const TRIP_PLACEHOLDER_NAME: &str = "Amazing Trip";

/// A stored user row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// A stored trip row. Dates are kept as the strings the client sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
}

/// Fields supplied by the trip-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTrip {
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
}

/// Trait for store backends
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up a user by email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Look up a user by id
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Insert a user row and return the new id
    async fn insert_user(&self, email: &str, name: &str) -> Result<i64, AppError>;

    /// Insert a trip row (with the placeholder name) and return the new id
    async fn insert_trip(&self, new_trip: NewTrip) -> Result<i64, AppError>;

    /// Whether a trip with this id exists
    async fn trip_exists(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    trips: Vec<Trip>,
}

/// Flat-file implementation of the Store trait
///
/// Tables live in memory and are rewritten to `users.json` / `trips.json`
/// under the data dir on every insert. Good enough for the handful of rows
/// this server sees; not a database.
#[derive(Clone)]
pub struct FlatFileStore {
    root: PathBuf,
    tables: Arc<RwLock<Tables>>,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let users = load_table(&root.join("users.json"))?;
        let trips = load_table(&root.join("trips.json"))?;

        Ok(Self {
            root,
            tables: Arc::new(RwLock::new(Tables { users, trips })),
        })
    }

    async fn persist<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(rows)?;
        tokio_fs::write(self.root.join(format!("{table}.json")), json).await?;
        Ok(())
    }
}

fn load_table<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn next_id(taken: impl Iterator<Item = i64>) -> i64 {
    taken.max().unwrap_or(0) + 1
}

#[async_trait]
impl Store for FlatFileStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, email: &str, name: &str) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(tables.users.iter().map(|u| u.id));
        tables.users.push(User {
            id,
            email: email.to_string(),
            name: name.to_string(),
        });
        self.persist("users", &tables.users).await?;
        Ok(id)
    }

    async fn insert_trip(&self, new_trip: NewTrip) -> Result<i64, AppError> {
        let mut tables = self.tables.write().await;
        let id = next_id(tables.trips.iter().map(|t| t.id));
        tables.trips.push(Trip {
            id,
            name: TRIP_PLACEHOLDER_NAME.to_string(),
            origin: new_trip.origin,
            destination: new_trip.destination,
            start_date: new_trip.start_date,
            end_date: new_trip.end_date,
        });
        self.persist("trips", &tables.trips).await?;
        Ok(id)
    }

    async fn trip_exists(&self, id: i64) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.trips.iter().any(|t| t.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (FlatFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FlatFileStore::new(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    fn sample_trip() -> NewTrip {
        NewTrip {
            origin: "Toronto".to_string(),
            destination: "Sydney".to_string(),
            start_date: "2018-10-01".to_string(),
            end_date: "2018-10-14".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let (store, _temp_dir) = setup();

        let id = store.insert_user("ada@example.com", "Ada").await.unwrap();
        assert_eq!(id, 1);

        let user = store.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "Ada");

        let by_email = store
            .find_user_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, id);

        assert!(store.find_user(999).await.unwrap().is_none());
        assert!(store
            .find_user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_user_ids_increment() {
        let (store, _temp_dir) = setup();

        let first = store.insert_user("a@example.com", "A").await.unwrap();
        let second = store.insert_user("b@example.com", "B").await.unwrap();
        assert_eq!(second, first + 1);
    }

    #[tokio::test]
    async fn test_trip_gets_placeholder_name() {
        let (store, _temp_dir) = setup();

        let id = store.insert_trip(sample_trip()).await.unwrap();
        assert!(store.trip_exists(id).await.unwrap());

        let tables = store.tables.read().await;
        let trip = tables.trips.iter().find(|t| t.id == id).unwrap();
        assert_eq!(trip.name, TRIP_PLACEHOLDER_NAME);
        assert_eq!(trip.origin, "Toronto");
    }

    #[tokio::test]
    async fn test_trip_exists_for_unknown_id() {
        let (store, _temp_dir) = setup();
        assert!(!store.trip_exists(41).await.unwrap());
    }

    #[tokio::test]
    async fn test_tables_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        let user_id;
        let trip_id;
        {
            let store = FlatFileStore::new(temp_dir.path()).unwrap();
            user_id = store.insert_user("ada@example.com", "Ada").await.unwrap();
            trip_id = store.insert_trip(sample_trip()).await.unwrap();
        }

        let reopened = FlatFileStore::new(temp_dir.path()).unwrap();
        let user = reopened.find_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert!(reopened.trip_exists(trip_id).await.unwrap());

        // ids keep counting from what is on disk
        let next = reopened.insert_user("bob@example.com", "Bob").await.unwrap();
        assert_eq!(next, user_id + 1);
    }
}
