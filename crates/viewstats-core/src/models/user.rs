use std::fmt;

use serde::{Deserialize, Serialize};

/// File type tag marking a user's avatar image.
pub const AVATAR_FILE_TYPE: &str = "avatar";

/// Sex code as sent by the API. Unknown codes are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sex {
    Male,
    Female,
    Other(String),
}

impl Sex {
    pub fn code(&self) -> &str {
        match self {
            Sex::Male => "M",
            Sex::Female => "W",
            Sex::Other(code) => code,
        }
    }

    pub fn is_male(&self) -> bool {
        matches!(self, Sex::Male)
    }
}

impl From<String> for Sex {
    fn from(code: String) -> Self {
        match code.as_str() {
            "M" => Sex::Male,
            "W" => Sex::Female,
            _ => Sex::Other(code),
        }
    }
}

impl From<Sex> for String {
    fn from(sex: Sex) -> Self {
        sex.code().to_string()
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub sex: Sex,
    pub username: String,
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    pub age: i32,
    #[serde(default)]
    pub files: Vec<UserFile>,
}

impl User {
    /// URL of the first file tagged as an avatar
    pub fn avatar_url(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.file_type == AVATAR_FILE_TYPE)
            .map(|f| f.url.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFile {
    pub id: i64,
    pub url: String,
    #[serde(rename = "type")]
    pub file_type: String,
}
