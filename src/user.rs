//! User records and the registration payload.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Clubs a member can pick as their favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Club {
    #[serde(rename = "Cache Valley Stone Society")]
    CacheValleyStoneSociety,
    #[serde(rename = "Ogden Curling Club")]
    OgdenCurlingClub,
    #[serde(rename = "Park City Curling Club")]
    ParkCityCurlingClub,
    #[serde(rename = "Salt City Curling Club")]
    SaltCityCurlingClub,
    #[serde(rename = "Utah Olympic Oval Curling Club")]
    UtahOlympicOvalCurlingClub,
}

impl Club {
    pub const ALL: [Club; 5] = [
        Club::CacheValleyStoneSociety,
        Club::OgdenCurlingClub,
        Club::ParkCityCurlingClub,
        Club::SaltCityCurlingClub,
        Club::UtahOlympicOvalCurlingClub,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Club::CacheValleyStoneSociety => "Cache Valley Stone Society",
            Club::OgdenCurlingClub => "Ogden Curling Club",
            Club::ParkCityCurlingClub => "Park City Curling Club",
            Club::SaltCityCurlingClub => "Salt City Curling Club",
            Club::UtahOlympicOvalCurlingClub => "Utah Olympic Oval Curling Club",
        }
    }

    /// Exact, case-sensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Club> {
        Club::ALL.into_iter().find(|club| club.name() == name)
    }
}

impl fmt::Display for Club {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A registered member.
///
/// The password is kept in plain text. This mirrors the service's observed
/// behavior and must not be used as-is for anything facing real users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub favorite_club: Club,
    pub news_letter: bool,
}

/// Body of `POST /register`. Every field is optional at this stage so the
/// validator can report which one is missing.
///
/// Decoding never fails on a field: falsy values (`null`, `false`, `0`, `""`)
/// read as absent, other non-string values as their JSON text, and
/// `newsLetter` is coerced by truthiness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default, deserialize_with = "deserialize_text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub favorite_club: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub news_letter: Option<bool>,
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !is_truthy(&value) {
        return Ok(None);
    }
    Ok(Some(match value {
        Value::String(text) => text,
        other => other.to_string(),
    }))
}

/// `null` means "not given"; anything else is read as a yes/no flag.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(text) => Some(flag_from_text(&text)),
        other => Some(is_truthy(&other)),
    })
}

fn flag_from_text(text: &str) -> bool {
    !matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "no" | "off"
    )
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Records present when the service starts.
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: "3c8da4d5-1597-46e7-baa1-e402aed70d80".to_string(),
            username: "sallyStudent".to_string(),
            password: "c00d1ng1sc00l".to_string(),
            favorite_club: Club::CacheValleyStoneSociety,
            news_letter: true,
        },
        User {
            id: "ce20079c-2326-4f17-8ac4-f617bfd28b7f".to_string(),
            username: "johnBlocton".to_string(),
            password: "veryg00dpassw0rd".to_string(),
            favorite_club: Club::SaltCityCurlingClub,
            news_letter: false,
        },
    ]
}
