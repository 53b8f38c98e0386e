//! Tier lists, their counters and public exploration

use crate::{
    conversion_error, id_to_bytes, now_millis, row_id, row_u64, SqliteStore, StoreError,
};
use rusqlite::{params, OptionalExtension};
use tierforge_domain::traits::{ExploreQuery, ExploreSort, TierListStore};
use tierforge_domain::{Engagement, RecordId, Resource, TierDocument, TierList};

/// Input for [`SqliteStore::create_tier_list`]
#[derive(Debug, Clone, Default)]
pub struct NewTierList {
    /// Category whose products are ranked
    pub category_id: RecordId,
    /// Title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether anyone may read the list
    pub is_public: bool,
    /// Initial tiers
    pub tiers: TierDocument,
}

const TIER_LIST_COLUMNS: &str = "t.id, t.user_id, t.category_id, t.title, t.description, \
     t.is_public, t.tiers, t.likes, t.views, t.created_at, t.updated_at";

fn tier_list_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TierList> {
    let tiers: String = row.get(6)?;
    let tiers = TierDocument::from_json(&tiers).map_err(|e| conversion_error(6, e))?;

    Ok(TierList {
        id: row_id(row, 0)?,
        owner: row_id(row, 1)?,
        category_id: row_id(row, 2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        is_public: row.get(5)?,
        tiers,
        likes: row_u64(row, 7)?,
        views: row_u64(row, 8)?,
        created_at: row_u64(row, 9)?,
        updated_at: row_u64(row, 10)?,
    })
}

fn order_clause(sort: ExploreSort) -> &'static str {
    match sort {
        ExploreSort::Popular => "(t.likes + t.views) DESC, t.created_at DESC",
        ExploreSort::Likes => "t.likes DESC, t.created_at DESC",
        ExploreSort::Views => "t.views DESC, t.created_at DESC",
        ExploreSort::Recent => "t.created_at DESC, t.rowid DESC",
    }
}

impl SqliteStore {
    /// Create a tier list over a category owned by `owner` (plan-checked)
    pub fn create_tier_list(
        &mut self,
        owner: RecordId,
        new: NewTierList,
    ) -> Result<TierList, StoreError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidData("Tier list title cannot be empty".to_string()));
        }
        self.owned_category(owner, new.category_id)?;
        self.enforce_limit(owner, Resource::TierLists)?;

        let now = now_millis();
        let tier_list = TierList {
            id: RecordId::new(),
            owner,
            category_id: new.category_id,
            title: title.to_string(),
            description: new.description,
            is_public: new.is_public,
            tiers: new.tiers,
            likes: 0,
            views: 0,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO tier_lists (id, user_id, category_id, title, description, is_public, tiers, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id_to_bytes(tier_list.id),
                id_to_bytes(owner),
                id_to_bytes(tier_list.category_id),
                &tier_list.title,
                &tier_list.description,
                tier_list.is_public,
                tier_list.tiers.to_json()?,
                now as i64,
                now as i64,
            ],
        )?;

        tracing::info!(
            tier_list = %tier_list.id,
            title = %tier_list.title,
            public = tier_list.is_public,
            "Created tier list"
        );
        Ok(tier_list)
    }

    /// Tier lists of `owner`, newest first
    pub fn list_tier_lists(&self, owner: RecordId) -> Result<Vec<TierList>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tier_lists t WHERE t.user_id = ?1 ORDER BY t.created_at DESC, t.rowid DESC",
            TIER_LIST_COLUMNS
        ))?;
        let lists = stmt
            .query_map(params![id_to_bytes(owner)], tier_list_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lists)
    }

    /// View and like totals across the tier lists of `owner`
    pub fn engagement(&self, owner: RecordId) -> Result<Engagement, StoreError> {
        Ok(self.list_tier_lists(owner)?.iter().collect())
    }

    /// Publish or hide a tier list
    pub fn set_public(
        &mut self,
        owner: RecordId,
        id: RecordId,
        is_public: bool,
    ) -> Result<(), StoreError> {
        self.check_owner(id, owner)?;
        self.conn.execute(
            "UPDATE tier_lists SET is_public = ?1, updated_at = ?2 WHERE id = ?3",
            params![is_public, now_millis() as i64, id_to_bytes(id)],
        )?;
        tracing::info!(tier_list = %id, public = is_public, "Changed visibility");
        Ok(())
    }

    /// Delete a tier list and its likes
    pub fn delete_tier_list(&mut self, owner: RecordId, id: RecordId) -> Result<(), StoreError> {
        self.check_owner(id, owner)?;
        self.conn
            .execute("DELETE FROM tier_lists WHERE id = ?1", params![id_to_bytes(id)])?;
        tracing::info!(tier_list = %id, "Deleted tier list");
        Ok(())
    }

    fn tier_list_owner(&self, id: RecordId) -> Result<Option<RecordId>, StoreError> {
        let owner = self
            .conn
            .query_row(
                "SELECT user_id FROM tier_lists WHERE id = ?1",
                params![id_to_bytes(id)],
                |row| row_id(row, 0),
            )
            .optional()?;
        Ok(owner)
    }

    fn check_owner(&self, id: RecordId, owner: RecordId) -> Result<(), StoreError> {
        match self.tier_list_owner(id)? {
            None => Err(StoreError::NotFound(format!("tier list {}", id))),
            Some(actual) if actual != owner => Err(StoreError::Forbidden(format!(
                "tier list {} belongs to another user",
                id
            ))),
            Some(_) => Ok(()),
        }
    }

    fn fetch_tier_list(&self, id: RecordId) -> Result<Option<TierList>, StoreError> {
        let list = self
            .conn
            .query_row(
                &format!("SELECT {} FROM tier_lists t WHERE t.id = ?1", TIER_LIST_COLUMNS),
                params![id_to_bytes(id)],
                tier_list_from_row,
            )
            .optional()?;
        Ok(list)
    }
}

impl TierListStore for SqliteStore {
    type Error = StoreError;

    /// Unreadable lists are reported as absent
    fn get_tier_list(
        &self,
        id: RecordId,
        viewer: Option<RecordId>,
    ) -> Result<Option<TierList>, Self::Error> {
        Ok(self.fetch_tier_list(id)?.filter(|list| list.readable_by(viewer)))
    }

    fn save_tiers(
        &mut self,
        id: RecordId,
        owner: RecordId,
        tiers: &TierDocument,
    ) -> Result<(), Self::Error> {
        self.check_owner(id, owner)?;
        self.conn.execute(
            "UPDATE tier_lists SET tiers = ?1, updated_at = ?2 WHERE id = ?3",
            params![tiers.to_json()?, now_millis() as i64, id_to_bytes(id)],
        )?;
        tracing::debug!(tier_list = %id, ranked = tiers.ranked_count(), "Saved tiers");
        Ok(())
    }

    fn record_view(&mut self, id: RecordId) -> Result<u64, Self::Error> {
        let changed = self.conn.execute(
            "UPDATE tier_lists SET views = views + 1 WHERE id = ?1",
            params![id_to_bytes(id)],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("tier list {}", id)));
        }
        let views = self.conn.query_row(
            "SELECT views FROM tier_lists WHERE id = ?1",
            params![id_to_bytes(id)],
            |row| row_u64(row, 0),
        )?;
        tracing::trace!(tier_list = %id, views, "Recorded view");
        Ok(views)
    }

    fn like(&mut self, id: RecordId, user: RecordId) -> Result<bool, Self::Error> {
        if self.get_tier_list(id, Some(user))?.is_none() {
            return Err(StoreError::NotFound(format!("tier list {}", id)));
        }

        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO tier_list_likes (tier_list_id, user_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![id_to_bytes(id), id_to_bytes(user), now_millis() as i64],
        )?;
        if inserted > 0 {
            tx.execute(
                "UPDATE tier_lists SET likes = likes + 1 WHERE id = ?1",
                params![id_to_bytes(id)],
            )?;
        }
        tx.commit()?;

        tracing::debug!(tier_list = %id, user = %user, added = inserted > 0, "Like");
        Ok(inserted > 0)
    }

    fn unlike(&mut self, id: RecordId, user: RecordId) -> Result<bool, Self::Error> {
        if self.tier_list_owner(id)?.is_none() {
            return Err(StoreError::NotFound(format!("tier list {}", id)));
        }

        let tx = self.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM tier_list_likes WHERE tier_list_id = ?1 AND user_id = ?2",
            params![id_to_bytes(id), id_to_bytes(user)],
        )?;
        if removed > 0 {
            tx.execute(
                "UPDATE tier_lists SET likes = MAX(likes - 1, 0) WHERE id = ?1",
                params![id_to_bytes(id)],
            )?;
        }
        tx.commit()?;

        tracing::debug!(tier_list = %id, user = %user, removed = removed > 0, "Unlike");
        Ok(removed > 0)
    }

    fn has_liked(&self, id: RecordId, user: RecordId) -> Result<bool, Self::Error> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM tier_list_likes WHERE tier_list_id = ?1 AND user_id = ?2",
                params![id_to_bytes(id), id_to_bytes(user)],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn explore(&self, query: &ExploreQuery) -> Result<Vec<TierList>, Self::Error> {
        let search = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());
        let category = query.category_id.map(id_to_bytes);
        // SQLite treats a negative LIMIT as unbounded
        let limit = query.limit.map(|n| n as i64).unwrap_or(-1);

        let sql = format!(
            "SELECT {} FROM tier_lists t
             JOIN categories c ON c.id = t.category_id
             WHERE t.is_public = 1
               AND (?1 IS NULL
                    OR instr(casefold(t.title), ?1) > 0
                    OR instr(casefold(coalesce(t.description, '')), ?1) > 0
                    OR instr(casefold(c.name), ?1) > 0)
               AND (?2 IS NULL OR t.category_id = ?2)
             ORDER BY {}
             LIMIT ?3",
            TIER_LIST_COLUMNS,
            order_clause(query.sort)
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let lists = stmt
            .query_map(params![search, category, limit], tier_list_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(results = lists.len(), sort = ?query.sort, "Explored tier lists");
        Ok(lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierforge_domain::{ProductRef, SubscriptionTier};

    struct Fixture {
        store: SqliteStore,
        owner: RecordId,
        other: RecordId,
        category: RecordId,
    }

    fn fixture() -> Fixture {
        let mut store = SqliteStore::new(":memory:").unwrap();
        let owner = store
            .create_profile("owner@example.com", None, SubscriptionTier::Standard)
            .unwrap()
            .id;
        let other = store
            .create_profile("other@example.com", None, SubscriptionTier::Standard)
            .unwrap()
            .id;
        let category = store.create_category(owner, "Mice", None).unwrap().id;
        Fixture {
            store,
            owner,
            other,
            category,
        }
    }

    fn new_list(category: RecordId, title: &str, is_public: bool) -> NewTierList {
        NewTierList {
            category_id: category,
            title: title.to_string(),
            is_public,
            ..Default::default()
        }
    }

    #[test]
    fn test_private_list_hidden_from_others() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Mine", false))
            .unwrap();

        assert!(f.store.get_tier_list(list.id, Some(f.owner)).unwrap().is_some());
        assert!(f.store.get_tier_list(list.id, Some(f.other)).unwrap().is_none());
        assert!(f.store.get_tier_list(list.id, None).unwrap().is_none());
    }

    #[test]
    fn test_save_tiers_ownership() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Mine", true))
            .unwrap();

        let mut doc = TierDocument::new();
        doc.insert("S", vec![ProductRef::from("p1")]);

        let result = f.store.save_tiers(list.id, f.other, &doc);
        assert!(matches!(result, Err(StoreError::Forbidden(_))));

        f.store.save_tiers(list.id, f.owner, &doc).unwrap();
        let loaded = f.store.get_tier_list(list.id, None).unwrap().unwrap();
        assert_eq!(loaded.tiers, doc);

        let missing = f.store.save_tiers(RecordId::new(), f.owner, &doc);
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_like_is_idempotent() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Public", true))
            .unwrap();

        assert!(f.store.like(list.id, f.other).unwrap());
        assert!(!f.store.like(list.id, f.other).unwrap());
        assert!(f.store.has_liked(list.id, f.other).unwrap());

        let loaded = f.store.get_tier_list(list.id, None).unwrap().unwrap();
        assert_eq!(loaded.likes, 1);

        assert!(f.store.unlike(list.id, f.other).unwrap());
        assert!(!f.store.unlike(list.id, f.other).unwrap());
        let loaded = f.store.get_tier_list(list.id, None).unwrap().unwrap();
        assert_eq!(loaded.likes, 0);
    }

    #[test]
    fn test_cannot_like_private_list_of_someone_else() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Private", false))
            .unwrap();

        let result = f.store.like(list.id, f.other);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_record_view_counts() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Public", true))
            .unwrap();

        assert_eq!(f.store.record_view(list.id).unwrap(), 1);
        assert_eq!(f.store.record_view(list.id).unwrap(), 2);
        assert!(matches!(
            f.store.record_view(RecordId::new()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut f = fixture();
        let result = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "  ", true));
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_explore_matches_accented_titles() {
        let mut f = fixture();
        f.store
            .create_tier_list(f.owner, new_list(f.category, "Écrans OLED", true))
            .unwrap();

        for term in ["Écrans", "écrans", "ÉCRANS OLED"] {
            let found = f
                .store
                .explore(&ExploreQuery {
                    search: Some(term.to_string()),
                    ..Default::default()
                })
                .unwrap();
            assert_eq!(found.len(), 1, "search for {:?}", term);
        }
    }

    #[test]
    fn test_engagement_sums_counters() {
        let mut f = fixture();
        let public = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Public", true))
            .unwrap();
        f.store
            .create_tier_list(f.owner, new_list(f.category, "Private", false))
            .unwrap();
        f.store.record_view(public.id).unwrap();
        f.store.record_view(public.id).unwrap();
        f.store.like(public.id, f.other).unwrap();

        let engagement = f.store.engagement(f.owner).unwrap();
        assert_eq!(engagement.tier_lists, 2);
        assert_eq!(engagement.public_tier_lists, 1);
        assert_eq!(engagement.views, 2);
        assert_eq!(engagement.likes, 1);
        assert_eq!(f.store.engagement(f.other).unwrap(), Engagement::default());
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let mut f = fixture();
        let list = f
            .store
            .create_tier_list(f.owner, new_list(f.category, "Mine", true))
            .unwrap();
        f.store
            .conn
            .execute(
                "UPDATE tier_lists SET created_at = -1 WHERE id = ?1",
                params![id_to_bytes(list.id)],
            )
            .unwrap();

        let result = f.store.get_tier_list(list.id, None);
        assert!(matches!(
            result,
            Err(StoreError::Database(rusqlite::Error::FromSqlConversionFailure(9, _, _)))
        ));
    }
}
