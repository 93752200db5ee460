use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    domain::{
        Category, Complaint, ComplaintId, ComplaintReason, ComplaintStatus, District, Listing,
        ListingId, NewListing, PhotoRef, UserId,
    },
    Result,
};

/// The closed set of single-field listing updates.
///
/// Field names are never interpolated from user input; a store implementation
/// maps each variant to its own typed setter.
#[derive(Clone, Debug)]
pub enum FieldUpdate {
    Title(String),
    Description(String),
    Price(u64),
    Category(Category),
    Photo(Option<PhotoRef>),
}

/// Aggregate counts for reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub listings: usize,
    pub favorites: usize,
    pub subscriptions: usize,
    pub open_complaints: usize,
}

/// Persistence port for listings, favorites, subscriptions and complaints.
///
/// Every call is atomic (all-or-nothing). The engine treats any `Err` as a
/// `StoreError`: surfaced to the user, session cleared, no retry.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create_listing(&self, new: NewListing) -> Result<Listing>;
    async fn listing(&self, id: ListingId) -> Result<Option<Listing>>;
    async fn listings(&self) -> Result<Vec<Listing>>;
    async fn listings_by_category(&self, category: Category) -> Result<Vec<Listing>>;
    async fn listings_by_district(&self, district: District) -> Result<Vec<Listing>>;
    async fn listings_by_author(&self, author: UserId) -> Result<Vec<Listing>>;
    async fn search(&self, keyword: &str) -> Result<Vec<Listing>>;
    /// Returns whether a row was affected.
    async fn update_field(&self, id: ListingId, update: FieldUpdate) -> Result<bool>;
    /// Deletes the listing and cascades its favorites and complaints.
    /// Returns whether a row was affected (idempotent on repeat).
    async fn delete_listing(&self, id: ListingId) -> Result<bool>;

    /// Returns false (no side effect) when the pair already exists.
    async fn add_favorite(&self, user: UserId, id: ListingId) -> Result<bool>;
    async fn remove_favorite(&self, user: UserId, id: ListingId) -> Result<bool>;
    async fn favorites(&self, user: UserId) -> Result<Vec<Listing>>;

    /// Returns false (no side effect) when the pair already exists.
    async fn add_subscription(&self, user: UserId, category: Category) -> Result<bool>;
    async fn remove_subscription(&self, user: UserId, category: Category) -> Result<bool>;
    async fn subscriptions(&self, user: UserId) -> Result<Vec<Category>>;
    async fn subscribers(&self, category: Category) -> Result<Vec<UserId>>;

    async fn create_complaint(
        &self,
        listing_id: ListingId,
        reporter: UserId,
        reason: ComplaintReason,
    ) -> Result<Complaint>;
    async fn complaint(&self, id: ComplaintId) -> Result<Option<Complaint>>;
    /// Marks a complaint resolved. Returns whether a row was affected.
    async fn resolve_complaint(&self, id: ComplaintId) -> Result<bool>;
    async fn open_complaints(&self) -> Result<Vec<Complaint>>;

    async fn counts(&self) -> Result<StoreCounts>;
}

#[derive(Default)]
struct MemoryInner {
    next_listing_id: i64,
    next_complaint_id: i64,
    listings: HashMap<ListingId, Listing>,
    favorites: Vec<(UserId, ListingId)>,
    subscriptions: Vec<(UserId, Category)>,
    complaints: HashMap<ComplaintId, Complaint>,
}

/// In-memory store. The original bot kept ads in process memory; a SQL-backed
/// store can implement the same port.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_id(mut listings: Vec<Listing>) -> Vec<Listing> {
    listings.sort_by_key(|l| l.id);
    listings
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn create_listing(&self, new: NewListing) -> Result<Listing> {
        let mut inner = self.inner.lock().await;
        inner.next_listing_id += 1;
        let listing = Listing {
            id: ListingId(inner.next_listing_id),
            title: new.title,
            description: new.description,
            price: new.price,
            category: new.category,
            district: new.district,
            photo: new.photo,
            author: new.author,
            author_handle: new.author_handle,
        };
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    async fn listing(&self, id: ListingId) -> Result<Option<Listing>> {
        Ok(self.inner.lock().await.listings.get(&id).cloned())
    }

    async fn listings(&self) -> Result<Vec<Listing>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(inner.listings.values().cloned().collect()))
    }

    async fn listings_by_category(&self, category: Category) -> Result<Vec<Listing>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(
            inner
                .listings
                .values()
                .filter(|l| l.category == category)
                .cloned()
                .collect(),
        ))
    }

    async fn listings_by_district(&self, district: District) -> Result<Vec<Listing>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(
            inner
                .listings
                .values()
                .filter(|l| l.district == Some(district))
                .cloned()
                .collect(),
        ))
    }

    async fn listings_by_author(&self, author: UserId) -> Result<Vec<Listing>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(
            inner
                .listings
                .values()
                .filter(|l| l.author == author)
                .cloned()
                .collect(),
        ))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Listing>> {
        let needle = keyword.to_lowercase();
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(
            inner
                .listings
                .values()
                .filter(|l| {
                    l.title.to_lowercase().contains(&needle)
                        || l.description.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn update_field(&self, id: ListingId, update: FieldUpdate) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(listing) = inner.listings.get_mut(&id) else {
            return Ok(false);
        };
        match update {
            FieldUpdate::Title(v) => listing.title = v,
            FieldUpdate::Description(v) => listing.description = v,
            FieldUpdate::Price(v) => listing.price = v,
            FieldUpdate::Category(v) => listing.category = v,
            FieldUpdate::Photo(v) => listing.photo = v,
        }
        Ok(true)
    }

    async fn delete_listing(&self, id: ListingId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.listings.remove(&id).is_none() {
            return Ok(false);
        }
        inner.favorites.retain(|(_, lid)| *lid != id);
        inner.complaints.retain(|_, c| c.listing_id != id);
        Ok(true)
    }

    async fn add_favorite(&self, user: UserId, id: ListingId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.favorites.contains(&(user, id)) {
            return Ok(false);
        }
        inner.favorites.push((user, id));
        Ok(true)
    }

    async fn remove_favorite(&self, user: UserId, id: ListingId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.favorites.len();
        inner.favorites.retain(|pair| *pair != (user, id));
        Ok(inner.favorites.len() != before)
    }

    async fn favorites(&self, user: UserId) -> Result<Vec<Listing>> {
        let inner = self.inner.lock().await;
        Ok(sorted_by_id(
            inner
                .favorites
                .iter()
                .filter(|(u, _)| *u == user)
                .filter_map(|(_, id)| inner.listings.get(id).cloned())
                .collect(),
        ))
    }

    async fn add_subscription(&self, user: UserId, category: Category) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        if inner.subscriptions.contains(&(user, category)) {
            return Ok(false);
        }
        inner.subscriptions.push((user, category));
        Ok(true)
    }

    async fn remove_subscription(&self, user: UserId, category: Category) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.subscriptions.len();
        inner.subscriptions.retain(|pair| *pair != (user, category));
        Ok(inner.subscriptions.len() != before)
    }

    async fn subscriptions(&self, user: UserId) -> Result<Vec<Category>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .subscriptions
            .iter()
            .filter(|(u, _)| *u == user)
            .map(|(_, c)| *c)
            .collect())
    }

    async fn subscribers(&self, category: Category) -> Result<Vec<UserId>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .subscriptions
            .iter()
            .filter(|(_, c)| *c == category)
            .map(|(u, _)| *u)
            .collect())
    }

    async fn create_complaint(
        &self,
        listing_id: ListingId,
        reporter: UserId,
        reason: ComplaintReason,
    ) -> Result<Complaint> {
        let mut inner = self.inner.lock().await;
        inner.next_complaint_id += 1;
        let complaint = Complaint {
            id: ComplaintId(inner.next_complaint_id),
            listing_id,
            reporter,
            reason,
            status: ComplaintStatus::New,
            created_at: Utc::now(),
        };
        inner.complaints.insert(complaint.id, complaint.clone());
        Ok(complaint)
    }

    async fn complaint(&self, id: ComplaintId) -> Result<Option<Complaint>> {
        Ok(self.inner.lock().await.complaints.get(&id).cloned())
    }

    async fn resolve_complaint(&self, id: ComplaintId) -> Result<bool> {
        let mut inner = self.inner.lock().await;
        let Some(complaint) = inner.complaints.get_mut(&id) else {
            return Ok(false);
        };
        complaint.status = ComplaintStatus::Resolved;
        Ok(true)
    }

    async fn open_complaints(&self) -> Result<Vec<Complaint>> {
        let inner = self.inner.lock().await;
        let mut out: Vec<Complaint> = inner
            .complaints
            .values()
            .filter(|c| c.status == ComplaintStatus::New)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let inner = self.inner.lock().await;
        Ok(StoreCounts {
            listings: inner.listings.len(),
            favorites: inner.favorites.len(),
            subscriptions: inner.subscriptions.len(),
            open_complaints: inner
                .complaints
                .values()
                .filter(|c| c.status == ComplaintStatus::New)
                .count(),
        })
    }
}
