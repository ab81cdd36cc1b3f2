//! Profile use-case service.
//!
//! # Responsibility
//! - Load the user profile from its key-value store once per launch.
//! - Expose explicit update+persist operations (name, image, mood, points).
//! - Detect rank transitions and drive the celebration flag.
//!
//! # Invariants
//! - Every mutation writes through to the store before the in-memory copy
//!   changes; a failed write leaves the in-memory profile untouched.
//! - Mood is restored only when it was chosen on the current local day.
//! - Points never decrease.

use crate::model::mood::Mood;
use crate::model::profile::UserProfile;
use crate::model::rank::UserRank;
use crate::repo::profile_repo::{keys, ProfileStore, ProfileValue};
use crate::repo::reminder_repo::RepoError;
use crate::service::celebration::CelebrationFlag;
use chrono::{DateTime, Local, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Service error for profile use-cases.
#[derive(Debug)]
pub enum ProfileError {
    /// Name is blank after trimming.
    InvalidName,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ProfileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "user name cannot be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProfileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidName => None,
        }
    }
}

impl From<RepoError> for ProfileError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of adding completion points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AwardOutcome {
    pub points_added: u32,
    pub total_points: u32,
    pub previous_rank: UserRank,
    pub rank: UserRank,
}

impl AwardOutcome {
    pub fn rank_changed(&self) -> bool {
        self.previous_rank != self.rank
    }
}

/// Profile facade over a `ProfileStore`.
pub struct ProfileService<S: ProfileStore> {
    store: S,
    profile: UserProfile,
    celebration: CelebrationFlag,
}

impl<S: ProfileStore> ProfileService<S> {
    /// Loads the profile relative to the current local time.
    pub fn load(store: S) -> Result<Self, ProfileError> {
        Self::load_at(store, Local::now())
    }

    /// Loads persisted fields, falling back to defaults for missing or
    /// unreadable values, and applies the daily mood reset.
    pub fn load_at(store: S, now: DateTime<Local>) -> Result<Self, ProfileError> {
        let mut profile = UserProfile::default();

        if let Some(name) = store.get(keys::USER_NAME)? {
            match name.as_text() {
                Some(value) => profile.user_name = value.to_string(),
                None => warn_unreadable(keys::USER_NAME),
            }
        }

        if let Some(points) = store.get(keys::USER_POINTS)? {
            match points.as_integer().and_then(|value| u32::try_from(value).ok()) {
                Some(value) => profile.points = value,
                None => warn_unreadable(keys::USER_POINTS),
            }
        }

        if let Some(image) = store.get(keys::PROFILE_IMAGE)? {
            match image.into_bytes() {
                Some(bytes) => profile.profile_image = Some(bytes),
                None => warn_unreadable(keys::PROFILE_IMAGE),
            }
        }

        profile.last_login_on = store
            .get(keys::LAST_LOGIN_DATE)?
            .and_then(|value| value.as_text().and_then(parse_date));

        if profile.last_login_on == Some(now.date_naive()) {
            profile.mood = store
                .get(keys::TODAY_MOOD)?
                .and_then(|value| value.as_text().and_then(Mood::from_tag));
        }

        info!(
            "event=profile_load module=profile status=ok points={} mood_restored={}",
            profile.points,
            profile.mood.is_some()
        );

        Ok(Self {
            store,
            profile,
            celebration: CelebrationFlag::new(),
        })
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn points(&self) -> u32 {
        self.profile.points
    }

    pub fn rank(&self) -> UserRank {
        self.profile.rank()
    }

    pub fn mood(&self) -> Option<Mood> {
        self.profile.mood
    }

    pub fn celebration(&self) -> &CelebrationFlag {
        &self.celebration
    }

    pub fn set_user_name(&mut self, name: &str) -> Result<(), ProfileError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProfileError::InvalidName);
        }
        self.store
            .set(keys::USER_NAME, ProfileValue::Text(trimmed.to_string()))?;
        self.profile.user_name = trimmed.to_string();
        Ok(())
    }

    /// Replaces or clears the profile image.
    pub fn set_profile_image(&mut self, image: Option<Vec<u8>>) -> Result<(), ProfileError> {
        match &image {
            Some(bytes) => self
                .store
                .set(keys::PROFILE_IMAGE, ProfileValue::Bytes(bytes.clone()))?,
            None => self.store.remove(keys::PROFILE_IMAGE)?,
        }
        self.profile.profile_image = image;
        Ok(())
    }

    pub fn set_mood(&mut self, mood: Mood) -> Result<(), ProfileError> {
        self.set_mood_at(mood, Local::now())
    }

    /// Records today's mood and marks `now` as the last login day.
    pub fn set_mood_at(&mut self, mood: Mood, now: DateTime<Local>) -> Result<(), ProfileError> {
        let today = now.date_naive();
        self.store.set(
            keys::LAST_LOGIN_DATE,
            ProfileValue::Text(today.format(DATE_FORMAT).to_string()),
        )?;
        self.store
            .set(keys::TODAY_MOOD, ProfileValue::Text(mood.as_tag().to_string()))?;

        self.profile.mood = Some(mood);
        self.profile.last_login_on = Some(today);
        Ok(())
    }

    /// Adds points, persists the total and fires the celebration on a rank
    /// change.
    pub fn award_points_at(
        &mut self,
        points: u32,
        now: DateTime<Local>,
    ) -> Result<AwardOutcome, ProfileError> {
        let outcome = self.persist_award(points)?;
        self.apply_award(&outcome, now);
        Ok(outcome)
    }

    /// Writes the new total without touching the in-memory profile, so the
    /// write can still be rolled back by an enclosing unit of work.
    pub(crate) fn persist_award(&self, points: u32) -> Result<AwardOutcome, ProfileError> {
        let total_points = self.profile.points.saturating_add(points);
        self.store
            .set(keys::USER_POINTS, ProfileValue::Integer(i64::from(total_points)))?;
        Ok(AwardOutcome {
            points_added: points,
            total_points,
            previous_rank: self.rank(),
            rank: UserRank::for_points(total_points),
        })
    }

    /// Mirrors a committed award in memory and fires the celebration.
    pub(crate) fn apply_award(&mut self, outcome: &AwardOutcome, now: DateTime<Local>) {
        self.profile.points = outcome.total_points;

        if outcome.rank_changed() {
            self.celebration.trigger_at(now);
            info!(
                "event=rank_up module=profile status=ok from={} to={} points={}",
                outcome.previous_rank, outcome.rank, outcome.total_points
            );
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn warn_unreadable(key: &str) {
    warn!("event=profile_load module=profile status=skip key={key} reason=unexpected_type");
}

#[cfg(test)]
mod tests {
    use super::ProfileService;
    use crate::db::open_db_in_memory;
    use crate::model::mood::Mood;
    use crate::model::rank::UserRank;
    use crate::repo::profile_repo::SqliteProfileStore;
    use chrono::{Duration, Local};

    #[test]
    fn award_crossing_a_threshold_triggers_celebration() {
        let conn = open_db_in_memory().unwrap();
        let now = Local::now();
        let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();

        let first = service.award_points_at(5, now).unwrap();
        assert!(!first.rank_changed());
        assert!(!service.celebration().is_active_at(now));

        let second = service.award_points_at(5, now).unwrap();
        assert_eq!(second.total_points, 10);
        assert_eq!(second.rank, UserRank::Apprentice);
        assert!(second.rank_changed());
        assert!(service.celebration().is_active_at(now + Duration::seconds(1)));
    }

    #[test]
    fn blank_name_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let mut service = ProfileService::load(SqliteProfileStore::new(&conn)).unwrap();
        assert!(service.set_user_name("  ").is_err());
        assert_eq!(service.profile().user_name, "Usuario");
    }

    #[test]
    fn mood_is_kept_in_memory_after_selection() {
        let conn = open_db_in_memory().unwrap();
        let now = Local::now();
        let mut service = ProfileService::load_at(SqliteProfileStore::new(&conn), now).unwrap();
        assert_eq!(service.mood(), None);
        service.set_mood_at(Mood::Happy, now).unwrap();
        assert_eq!(service.mood(), Some(Mood::Happy));
        assert_eq!(service.profile().last_login_on, Some(now.date_naive()));
    }
}
