mod user;

pub use user::{UserDraft, UserRecord};
