use serde::{Deserialize, Serialize};
use crate::player::UserInfo;

/// Body of `/api/create-account` and `/api/signin`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/game-stats`.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GameResult {
    pub winner: String,
    pub loser: String,
    #[serde(rename = "gameId", default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default)]
    pub draw: bool,
}

/// Per-player counters. Field names on the wire are capitalized.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PlayerStats {
    #[serde(rename = "Wins")]
    pub wins: i64,
    #[serde(rename = "Losses")]
    pub losses: i64,
    #[serde(rename = "GamesPlayed")]
    pub games_played: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CombinedProfile {
    pub stats: PlayerStats,
    pub auth: UserInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_use_capitalized_keys() {
        let stats = PlayerStats { wins: 2, losses: 1, games_played: 3 };
        let json = serde_json::to_value(stats).unwrap();

        assert_eq!(json, serde_json::json!({ "Wins": 2, "Losses": 1, "GamesPlayed": 3 }));
    }

    #[test]
    fn test_game_result_optional_fields() {
        let result: GameResult =
            serde_json::from_str(r#"{"winner":"alice","loser":"bob"}"#).unwrap();
        assert_eq!(result.game_id, None);
        assert!(!result.draw);

        let result: GameResult = serde_json::from_str(
            r#"{"winner":"alice","loser":"bob","gameId":"g-17","draw":true}"#,
        )
        .unwrap();
        assert_eq!(result.game_id.as_deref(), Some("g-17"));
        assert!(result.draw);
    }

    #[test]
    fn test_combined_profile_shape() {
        let profile = CombinedProfile {
            stats: PlayerStats { wins: 1, losses: 0, games_played: 1 },
            auth: UserInfo { id: 7, username: "carol".to_string() },
        };
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["auth"]["username"], "carol");
        assert_eq!(json["auth"]["id"], 7);
        assert_eq!(json["stats"]["GamesPlayed"], 1);
    }
}
