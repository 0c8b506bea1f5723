use std::sync::Arc;

use sqlx::any::AnyPoolOptions;
use sqlx::migrate::Migrator;
use sqlx::{AnyPool, FromRow};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::passwords::PasswordHasher;

static POSTGRES_MIGRATIONS: Migrator = sqlx::migrate!("../migrations/postgres");
static SQLITE_MIGRATIONS: Migrator = sqlx::migrate!("../migrations/sqlite");

const UPSERT_WINNER: &str = "INSERT INTO player_stats (player_id, wins, losses, games_played)
     VALUES ($1, 1, 0, 1)
     ON CONFLICT (player_id) DO UPDATE
     SET wins = player_stats.wins + 1, games_played = player_stats.games_played + 1";

const UPSERT_LOSER: &str = "INSERT INTO player_stats (player_id, wins, losses, games_played)
     VALUES ($1, 0, 1, 1)
     ON CONFLICT (player_id) DO UPDATE
     SET losses = player_stats.losses + 1, games_played = player_stats.games_played + 1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    pub fn from_url(database_url: &str) -> Result<Self, StoreError> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else if database_url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else {
            let scheme = database_url.split(':').next().unwrap_or_default();
            Err(StoreError::UnsupportedBackend(format!("{scheme}://")))
        }
    }

    /// True for SQLite URLs whose data lives only inside one connection.
    fn is_in_memory(database_url: &str) -> bool {
        database_url.contains(":memory:") || database_url.contains("mode=memory")
    }

    fn migrator(self) -> &'static Migrator {
        match self {
            Backend::Postgres => &POSTGRES_MIGRATIONS,
            Backend::Sqlite => &SQLITE_MIGRATIONS,
        }
    }
}

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
    backend: Backend,
    hasher: PasswordHasher,
}

#[derive(Debug, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, FromRow, PartialEq, Eq)]
pub struct StatsRecord {
    pub wins: i64,
    pub losses: i64,
    pub games_played: i64,
}

impl Database {
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub async fn new(
        database_url: &str,
        max_connections: u32,
        hasher: PasswordHasher,
    ) -> Result<Self, StoreError> {
        sqlx::any::install_default_drivers();
        let backend = Backend::from_url(database_url)?;

        let mut max_connections = max_connections.max(1);
        if backend == Backend::Sqlite && Backend::is_in_memory(database_url) {
            // Every connection would otherwise open its own empty database.
            max_connections = 1;
        }

        let mut options = AnyPoolOptions::new().max_connections(max_connections);
        if backend == Backend::Sqlite {
            // An in-memory database lives only as long as its connection.
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect(database_url).await?;
        Ok(Database { pool, backend, hasher })
    }

    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let hasher = PasswordHasher::new(config.password_cost);
        Self::new(&config.connection_url()?, config.max_connections, hasher).await
    }

    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.backend.migrator().run(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    // Credential operations

    /// True iff `username` exists and `password` matches its stored hash.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        debug!("DB: Authenticating user '{username}'");

        let stored: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            Some(password_hash) => self.hasher.verify(password, &password_hash).await,
            None => {
                debug!("DB: No user named '{username}'");
                self.hasher.verify_unknown(password).await
            }
        }
    }

    /// Inserts a new user and returns its id.
    pub async fn save_user(&self, username: &str, password: &str) -> Result<i64, StoreError> {
        debug!("DB: Inserting user '{username}'");
        let password_hash = self.hasher.hash(password).await?;

        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => {
                info!("DB: User '{username}' inserted with ID: {id}");
                Ok(id)
            }
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                debug!("DB: Username '{username}' already taken");
                Err(StoreError::Duplicate)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, username: &str) -> Result<UserRecord, StoreError> {
        sqlx::query_as::<_, UserRecord>("SELECT id, username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))
    }

    // Stats operations

    /// Counts one win for `winner_id` and one loss for `loser_id`. Both rows
    /// change in a single transaction or not at all.
    pub async fn record_result(&self, winner_id: &str, loser_id: &str) -> Result<(), StoreError> {
        debug!("DB: Recording result winner='{winner_id}' loser='{loser_id}'");

        let mut tx = self.pool.begin().await?;

        for (statement, player_id) in upsert_order(winner_id, loser_id) {
            sqlx::query(statement)
                .bind(player_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_stats(&self, player_id: &str) -> Result<StatsRecord, StoreError> {
        sqlx::query_as::<_, StatsRecord>(
            "SELECT wins, losses, games_played FROM player_stats WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("stats for {player_id}")))
    }
}

/// Winner and loser upserts sorted by player id. Every transaction locks the
/// two rows in the same order, so `(a, b)` and `(b, a)` cannot deadlock.
fn upsert_order<'a>(winner_id: &'a str, loser_id: &'a str) -> [(&'static str, &'a str); 2] {
    let winner = (UPSERT_WINNER, winner_id);
    let loser = (UPSERT_LOSER, loser_id);
    if loser_id < winner_id {
        [loser, winner]
    } else {
        [winner, loser]
    }
}

/// Initialize-once holder for the shared [`Database`], passed to handlers via
/// the application state.
#[derive(Clone, Default)]
pub struct DatabaseHandle {
    cell: Arc<OnceCell<Database>>,
}

impl DatabaseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_database(database: Database) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(database))),
        }
    }

    /// Opens and migrates the database on the first call. Later calls return
    /// the instance created by the first successful one.
    pub async fn connect(&self, config: &DatabaseConfig) -> Result<&Database, StoreError> {
        self.cell
            .get_or_try_init(|| async {
                let database = Database::from_config(config).await?;
                database.initialize().await?;
                info!("DB: Connected to {:?} database", database.backend());
                Ok::<_, StoreError>(database)
            })
            .await
    }

    pub fn get_instance(&self) -> Result<&Database, StoreError> {
        self.cell.get().ok_or(StoreError::NotInitialized)
    }
}
