use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// A row of the `users` table. `id` is only ever assigned by storage.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Display)]
#[display("user {}", id)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub statement: i64,
}

/// The mutable fields of a user, as accepted by create and update.
///
/// Missing fields fall back to their zero value and any `id` in the
/// payload is ignored, so updates always replace every field.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UserDraft {
    pub name: String,
    pub statement: i64,
}

impl UserDraft {
    pub fn into_record(self, id: i64) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            statement: self.statement,
        }
    }
}
