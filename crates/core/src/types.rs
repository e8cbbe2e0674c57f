use crate::storage::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account record as returned by `GET /auth/me`.
///
/// The backend owns this record; the client only caches a copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Numeric and UUID ids are both kept as text
    #[serde(deserialize_with = "user_id::deserialize")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
    /// Prepaid balance in UZS
    pub balance: Decimal,
    #[serde(default)]
    pub oauth_provider: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Access/refresh token pair issued by login, register and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Body of `POST /auth/refresh`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Where a session stands in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No access token
    Anonymous,
    /// Access token present, user not fetched yet
    Pending,
    /// Access token and user present
    Authenticated,
}

/// In-memory view of the current user and tokens
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Seed a session from the tokens persisted by a previous run
    pub fn from_store(store: &dyn KeyValueStore) -> Self {
        Self {
            user: None,
            access_token: store.get(ACCESS_TOKEN_KEY),
            refresh_token: store.get(REFRESH_TOKEN_KEY),
        }
    }

    pub const fn is_authenticated(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }

    /// A token is held but the user behind it has not been fetched
    pub const fn needs_user(&self) -> bool {
        self.access_token.is_some() && self.user.is_none()
    }

    pub const fn phase(&self) -> SessionPhase {
        match (&self.access_token, &self.user) {
            (None, _) => SessionPhase::Anonymous,
            (Some(_), None) => SessionPhase::Pending,
            (Some(_), Some(_)) => SessionPhase::Authenticated,
        }
    }

    pub fn set_tokens(&mut self, tokens: &TokenPair) {
        self.access_token = Some(tokens.access_token.clone());
        self.refresh_token = Some(tokens.refresh_token.clone());
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

mod user_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(id) => id,
            RawId::Number(id) => id.to_string(),
        })
    }
}

/// Timestamps from the backend may or may not carry an offset; naive ones are UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|dt| dt.and_utc()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use chrono::TimeZone;
    use serde_json::json;

    fn user_json() -> serde_json::Value {
        json!({
            "id": 7,
            "email": "aziza@example.uz",
            "full_name": null,
            "is_active": true,
            "is_verified": false,
            "balance": 125000.5,
            "oauth_provider": "google",
            "created_at": "2024-03-01T10:15:00"
        })
    }

    #[test]
    fn user_accepts_naive_timestamps_and_missing_optionals() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.balance, Decimal::new(1_250_005, 1));
        assert_eq!(
            user.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()
        );
        assert_eq!(user.updated_at, None);
        assert_eq!(user.oauth_provider.as_deref(), Some("google"));
    }

    #[test]
    fn user_accepts_offset_timestamps() {
        let mut value = user_json();
        value["created_at"] = json!("2024-03-01T15:15:00+05:00");
        value["updated_at"] = json!("2024-03-02T00:00:00.123456Z");
        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(
            user.created_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap()
        );
        assert!(user.updated_at.is_some());
    }

    #[test]
    fn user_accepts_uuid_id_without_flags() {
        let value = json!({
            "id": "5b1f3c2e-8d4a-4f6b-9c1e-2a7d9e0f4b31",
            "email": "aziza@example.uz",
            "balance": 1000,
            "created_at": "2024-03-01T10:15:00Z",
            "updated_at": "2024-03-05T08:00:00Z"
        });
        let user: User = serde_json::from_value(value).unwrap();
        assert_eq!(user.id, "5b1f3c2e-8d4a-4f6b-9c1e-2a7d9e0f4b31");
        assert!(!user.is_active);
        assert!(!user.is_verified);
        assert_eq!(user.full_name, None);
        assert_eq!(user.balance, Decimal::new(1000, 0));
        assert!(user.updated_at.is_some());
    }

    #[test]
    fn user_rejects_garbage_timestamps() {
        let mut value = user_json();
        value["created_at"] = json!("yesterday");
        assert!(serde_json::from_value::<User>(value).is_err());
    }

    #[test]
    fn register_omits_missing_full_name() {
        let data = RegisterData {
            email: "a@b.uz".into(),
            password: "secret".into(),
            full_name: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert!(value.get("full_name").is_none());
    }

    #[test]
    fn session_phases() {
        let mut session = Session::default();
        assert_eq!(session.phase(), SessionPhase::Anonymous);
        assert!(!session.is_authenticated());

        session.set_tokens(&TokenPair::new("a", "r"));
        assert_eq!(session.phase(), SessionPhase::Pending);
        assert!(session.needs_user());
        assert!(!session.is_authenticated());

        session.user = Some(serde_json::from_value(user_json()).unwrap());
        assert_eq!(session.phase(), SessionPhase::Authenticated);
        assert!(session.is_authenticated());

        session.clear();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn user_without_token_is_not_authenticated() {
        let session = Session {
            user: Some(serde_json::from_value(user_json()).unwrap()),
            access_token: None,
            refresh_token: Some("r".into()),
        };
        assert!(!session.is_authenticated());
        assert_eq!(session.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn session_seeds_from_store() {
        let store = MemoryStore::with_entries([("access_token", "a1"), ("refresh_token", "r1")]);
        let session = Session::from_store(&store);
        assert_eq!(session.access_token.as_deref(), Some("a1"));
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));
        assert!(session.user.is_none());
    }
}
