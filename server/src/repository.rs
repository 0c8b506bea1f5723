use statsd_common::*;
use tracing::debug;

use crate::database::{Database, StatsRecord, UserRecord};
use crate::error::StoreError;

pub async fn fetch_user(database: &Database, username: &str) -> Result<UserInfo, StoreError> {
    debug!("REPO: Fetching user '{username}'");
    Ok(database.get_user(username).await?.to_user_info())
}

pub async fn fetch_stats(database: &Database, player_id: &str) -> Result<PlayerStats, StoreError> {
    debug!("REPO: Fetching stats for '{player_id}'");
    Ok(database.get_stats(player_id).await?.to_player_stats())
}

/// Account and stats for one username. Missing either one is a not-found.
pub async fn fetch_combined_profile(
    database: &Database,
    username: &str,
) -> Result<CombinedProfile, StoreError> {
    let auth = fetch_user(database, username).await?;
    let stats = fetch_stats(database, username).await?;

    Ok(CombinedProfile { stats, auth })
}

impl UserRecord {
    fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

impl StatsRecord {
    fn to_player_stats(&self) -> PlayerStats {
        PlayerStats {
            wins: self.wins,
            losses: self.losses,
            games_played: self.games_played,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::memory_database;

    #[tokio::test]
    async fn test_combined_profile() {
        let db = memory_database().await;
        let id = db.save_user("alice", "pw").await.unwrap();
        db.record_result("alice", "bob").await.unwrap();

        let profile = fetch_combined_profile(&db, "alice").await.unwrap();

        assert_eq!(profile.auth, UserInfo { id, username: "alice".to_string() });
        assert_eq!(profile.stats, PlayerStats { wins: 1, losses: 0, games_played: 1 });
    }

    #[tokio::test]
    async fn test_combined_profile_without_stats_is_not_found() {
        let db = memory_database().await;
        db.save_user("alice", "pw").await.unwrap();

        let result = fetch_combined_profile(&db, "alice").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_combined_profile_without_user_is_not_found() {
        let db = memory_database().await;
        db.record_result("alice", "bob").await.unwrap();

        let result = fetch_combined_profile(&db, "alice").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
