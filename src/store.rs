/// In-memory review list shared by the storefront pages.
/// There is no backend; records live for as long as the app does.
use chrono::{DateTime, TimeZone, Utc};
use leptos::logging::log;
use leptos::*;
use thiserror::Error;

use crate::models::review::{ReplyComment, ReviewDraft, ReviewRecord, ReviewUser};
use crate::validation::MAX_RATING;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("review store is no longer available")]
    Unavailable,
}

/// Somewhere to append a validated review.
pub trait ReviewSink {
    fn append(&mut self, draft: &ReviewDraft, created_at: DateTime<Utc>) -> Result<ReviewRecord, SinkError>;
}

/// Ordered, append-only list of reviews.
/// Ids come from a counter that only moves forward, so they stay unique
/// even though the list is shared.
#[derive(Debug, Clone, Default)]
pub struct MockReviews {
    reviews: Vec<ReviewRecord>,
    next_id: usize,
}

impl MockReviews {
    pub fn new(reviews: Vec<ReviewRecord>) -> Self {
        let next_id = reviews.iter().map(|r| r.id + 1).max().unwrap_or(0);
        Self { reviews, next_id }
    }

    /// The storefront's pre-existing reviews.
    pub fn seeded() -> Self {
        Self::new(seed_reviews())
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ReviewRecord> {
        self.reviews.iter()
    }

    pub fn get(&self, id: usize) -> Option<&ReviewRecord> {
        self.reviews.iter().find(|r| r.id == id)
    }

    pub fn average_rating(&self) -> Option<f32> {
        if self.reviews.is_empty() {
            return None;
        }
        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        Some(total as f32 / self.reviews.len() as f32)
    }

    /// Number of reviews per star, index 0 holding one-star reviews.
    pub fn rating_counts(&self) -> [usize; MAX_RATING as usize] {
        let mut counts = [0; MAX_RATING as usize];
        for review in &self.reviews {
            if let Some(slot) = usize::from(review.rating)
                .checked_sub(1)
                .and_then(|i| counts.get_mut(i))
            {
                *slot += 1;
            }
        }
        counts
    }
}

impl ReviewSink for MockReviews {
    fn append(&mut self, draft: &ReviewDraft, created_at: DateTime<Utc>) -> Result<ReviewRecord, SinkError> {
        let record = ReviewRecord::from_draft(self.next_id, draft, created_at);
        self.next_id += 1;
        self.reviews.push(record.clone());
        Ok(record)
    }
}

/// Reactive handle to the shared review list.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStore {
    reviews: RwSignal<MockReviews>,
}

impl ReviewStore {
    pub fn new(reviews: MockReviews) -> Self {
        Self {
            reviews: create_rw_signal(reviews),
        }
    }

    pub fn seeded() -> Self {
        Self::new(MockReviews::seeded())
    }

    /// Reads the list, subscribing the caller when inside a reactive scope.
    pub fn with<R>(&self, f: impl FnOnce(&MockReviews) -> R) -> R {
        self.reviews.with(f)
    }

    /// Drops the shared list. Later appends fail with `SinkError::Unavailable`.
    pub fn dispose(self) {
        self.reviews.dispose();
    }
}

impl ReviewSink for ReviewStore {
    fn append(&mut self, draft: &ReviewDraft, created_at: DateTime<Utc>) -> Result<ReviewRecord, SinkError> {
        let record = self
            .reviews
            .try_update(|reviews| reviews.append(draft, created_at))
            .ok_or(SinkError::Unavailable)??;

        match serde_json::to_string(&record) {
            Ok(json) => log!("[STORE] Appended review {}: {}", record.id, json),
            Err(e) => log!("[STORE] Appended review {} (unserializable: {})", record.id, e),
        }
        Ok(record)
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn seed_reviews() -> Vec<ReviewRecord> {
    let jayvion = ReviewUser {
        id: "user-1".into(),
        name: "Jayvion Simon".into(),
        avatar_url: "/assets/avatars/avatar_1.jpg".into(),
    };
    let lucian = ReviewUser {
        id: "user-2".into(),
        name: "Lucian Obrien".into(),
        avatar_url: "/assets/avatars/avatar_2.jpg".into(),
    };

    vec![
        ReviewRecord {
            id: 0,
            name: jayvion.name.clone(),
            avatar_url: jayvion.avatar_url.clone(),
            message: "Fits perfectly and the fabric holds up after several washes.".into(),
            created_at: at(1_704_103_200),
            rating: 5,
            helpful: 12,
            users: vec![lucian.clone()],
            reply_comment: vec![ReplyComment {
                id: "reply-1".into(),
                user_id: lucian.id.clone(),
                message: "Agreed, mine still looks new.".into(),
                created_at: at(1_704_189_600),
                tag_user: Some(jayvion.name.clone()),
            }],
        },
        ReviewRecord {
            id: 1,
            name: lucian.name.clone(),
            avatar_url: lucian.avatar_url.clone(),
            message: "Shipping took a while, product is fine.".into(),
            created_at: at(1_706_781_600),
            rating: 3,
            helpful: 2,
            users: Vec::new(),
            reply_comment: Vec::new(),
        },
        ReviewRecord {
            id: 2,
            name: "Deja Brady".into(),
            avatar_url: String::new(),
            message: "Runs a little small, order one size up.".into(),
            created_at: at(1_709_287_200),
            rating: 4,
            helpful: 5,
            users: vec![jayvion],
            reply_comment: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(rating: u8) -> ReviewDraft {
        ReviewDraft {
            rating: Some(rating),
            review: "Great product".into(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
        }
    }

    #[test]
    fn test_append_keeps_order_and_assigns_ids() {
        let mut reviews = MockReviews::default();
        let first = reviews.append(&draft(4), at(0)).unwrap();
        let second = reviews.append(&draft(2), at(1)).unwrap();

        assert_eq!(first.id, 0);
        assert_eq!(second.id, 1);
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![4, 2]);
    }

    #[test]
    fn test_iterates_newest_first() {
        let mut reviews = MockReviews::seeded();
        reviews.append(&draft(5), at(1_710_000_000)).unwrap();

        let ids: Vec<usize> = reviews.iter().rev().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_seeded_ids_continue_after_existing() {
        let mut reviews = MockReviews::seeded();
        let before = reviews.len();
        let record = reviews.append(&draft(5), at(0)).unwrap();

        assert_eq!(reviews.len(), before + 1);
        assert!(reviews.iter().filter(|r| r.id == record.id).count() == 1);
        assert_eq!(reviews.get(record.id), Some(&record));
    }

    #[test]
    fn test_ids_do_not_follow_list_length() {
        // A list with a gap in its ids must not hand out a duplicate.
        let mut seed = seed_reviews();
        seed.remove(0);
        let mut reviews = MockReviews::new(seed);
        let record = reviews.append(&draft(5), at(0)).unwrap();

        assert_eq!(reviews.len(), 3);
        assert_eq!(record.id, 3);
    }

    #[test]
    fn test_rating_summary() {
        let mut reviews = MockReviews::default();
        assert_eq!(reviews.average_rating(), None);

        for rating in [5, 4, 4, 1] {
            reviews.append(&draft(rating), at(0)).unwrap();
        }
        assert_eq!(reviews.average_rating(), Some(3.5));
        assert_eq!(reviews.rating_counts(), [1, 0, 0, 2, 1]);
    }

    #[test]
    fn test_reactive_store_append() {
        let runtime = create_runtime();
        let mut store = ReviewStore::new(MockReviews::default());

        let record = store.append(&draft(4), at(0)).unwrap();
        assert_eq!(record.id, 0);
        assert_eq!(store.with(|r| r.len()), 1);

        runtime.dispose();
    }

    #[test]
    fn test_disposed_store_is_unavailable() {
        let runtime = create_runtime();
        let mut store = ReviewStore::new(MockReviews::default());
        store.dispose();

        assert_eq!(store.append(&draft(4), at(0)), Err(SinkError::Unavailable));

        runtime.dispose();
    }
}
