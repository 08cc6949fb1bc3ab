pub mod attempts;
pub mod bookmarks;
pub mod focus_logs;
pub mod mastery;
pub mod profiles;
pub mod questions;
pub mod sessions;
pub mod users;
