//! User profile state.
//!
//! # Invariants
//! - `points` never decreases.
//! - Rank is derived from `points` and never stored.

use crate::model::mood::Mood;
use crate::model::rank::UserRank;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_USER_NAME: &str = "Usuario";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_name: String,
    pub points: u32,
    pub profile_image: Option<Vec<u8>>,
    /// Cleared on the first load of a new calendar day.
    pub mood: Option<Mood>,
    /// Local date of the last mood selection.
    pub last_login_on: Option<NaiveDate>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            points: 0,
            profile_image: None,
            mood: None,
            last_login_on: None,
        }
    }
}

impl UserProfile {
    pub fn rank(&self) -> UserRank {
        UserRank::for_points(self.points)
    }
}
