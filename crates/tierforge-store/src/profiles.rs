//! Profiles, subscriptions and usage counting

use crate::{id_to_bytes, map_unique, now_millis, row_id, SqliteStore, StoreError};
use rusqlite::{params, OptionalExtension};
use tierforge_domain::traits::UsageSource;
use tierforge_domain::{Profile, RecordId, SubscriptionTier, Usage};

const PROFILE_COLUMNS: &str = "id, email, username, subscription_tier";

fn profile_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Profile> {
    let tier: String = row.get(3)?;
    Ok(Profile {
        id: row_id(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        subscription: SubscriptionTier::parse_or_standard(&tier),
    })
}

impl SqliteStore {
    /// Register a new profile
    ///
    /// # Errors
    /// Returns [`StoreError::Duplicate`] if the email is taken.
    pub fn create_profile(
        &mut self,
        email: &str,
        username: Option<&str>,
        subscription: SubscriptionTier,
    ) -> Result<Profile, StoreError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(StoreError::InvalidData(format!("Invalid email: '{}'", email)));
        }

        let profile = Profile {
            id: RecordId::new(),
            email: email.to_string(),
            username: username.map(str::to_string),
            subscription,
        };

        self.conn
            .execute(
                "INSERT INTO profiles (id, email, username, subscription_tier, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    id_to_bytes(profile.id),
                    &profile.email,
                    &profile.username,
                    subscription.as_str(),
                    now_millis() as i64,
                ],
            )
            .map_err(|e| map_unique(e, format!("profile with email {}", profile.email)))?;

        tracing::info!(profile = %profile.id, plan = %subscription, "Created profile");
        Ok(profile)
    }

    /// Get a profile by ID
    pub fn get_profile(&self, id: RecordId) -> Result<Option<Profile>, StoreError> {
        let profile = self
            .conn
            .query_row(
                &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
                params![id_to_bytes(id)],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// Look a profile up by email (case-insensitive)
    pub fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let profile = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM profiles WHERE casefold(email) = casefold(?1)",
                    PROFILE_COLUMNS
                ),
                params![email.trim()],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }

    /// Change a profile's plan
    pub fn set_subscription(
        &mut self,
        id: RecordId,
        subscription: SubscriptionTier,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE profiles SET subscription_tier = ?1 WHERE id = ?2",
            params![subscription.as_str(), id_to_bytes(id)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("profile {}", id)));
        }
        tracing::info!(profile = %id, plan = %subscription, "Changed subscription");
        Ok(())
    }

    fn count_owned(&self, table: &str, owner: RecordId) -> Result<u32, StoreError> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE user_id = ?1", table),
            params![id_to_bytes(owner)],
            |row| row.get(0),
        )?;
        u32::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("{} count out of range: {}", table, count)))
    }
}

impl UsageSource for SqliteStore {
    type Error = StoreError;

    fn usage(&self, owner: RecordId) -> Result<Usage, Self::Error> {
        Ok(Usage {
            categories: self.count_owned("categories", owner)?,
            products: self.count_owned("products", owner)?,
            parameters: self.count_owned("parameters", owner)?,
            tier_lists: self.count_owned("tier_lists", owner)?,
        })
    }

    fn subscription(&self, owner: RecordId) -> Result<SubscriptionTier, Self::Error> {
        self.get_profile(owner)?
            .map(|p| p.subscription)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", owner)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find_profile() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let profile = store
            .create_profile("ana@example.com", Some("ana"), SubscriptionTier::Pro)
            .unwrap();

        let found = store.find_profile_by_email("ANA@example.com").unwrap().unwrap();
        assert_eq!(found, profile);
        assert_eq!(store.subscription(profile.id).unwrap(), SubscriptionTier::Pro);
    }

    #[test]
    fn test_duplicate_email() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store
            .create_profile("ana@example.com", None, SubscriptionTier::Standard)
            .unwrap();
        let result = store.create_profile("ana@example.com", None, SubscriptionTier::Standard);
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_invalid_email() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let result = store.create_profile("nobody", None, SubscriptionTier::Standard);
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_usage_of_new_profile() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let profile = store
            .create_profile("ana@example.com", None, SubscriptionTier::Standard)
            .unwrap();
        assert_eq!(store.usage(profile.id).unwrap(), Usage::default());
    }

    #[test]
    fn test_subscription_of_unknown_profile() {
        let store = SqliteStore::new(":memory:").unwrap();
        assert!(matches!(
            store.subscription(RecordId::new()),
            Err(StoreError::NotFound(_))
        ));
    }
}
