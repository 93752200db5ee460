use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

/// Listing id assigned by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingId(pub i64);

/// Complaint id assigned by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComplaintId(pub i64);

/// Opaque photo handle (the transport's file id for the largest variant).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhotoRef(pub String);

/// The acting user as seen by the transport: id plus a display handle.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: UserId,
    pub handle: String,
}

/// Fixed listing categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Transport,
    Electronics,
    Furniture,
    Clothing,
    Services,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Transport,
        Category::Electronics,
        Category::Furniture,
        Category::Clothing,
        Category::Services,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Transport => "Transport",
            Category::Electronics => "Electronics",
            Category::Furniture => "Furniture",
            Category::Clothing => "Clothing",
            Category::Services => "Services",
            Category::Other => "Other",
        }
    }

    pub fn from_label(s: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.label() == s)
    }
}

/// Fixed districts (optional on a listing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum District {
    Central,
    North,
    South,
    East,
    West,
}

impl District {
    pub const ALL: [District; 5] = [
        District::Central,
        District::North,
        District::South,
        District::East,
        District::West,
    ];

    pub fn label(self) -> &'static str {
        match self {
            District::Central => "Central",
            District::North => "North",
            District::South => "South",
            District::East => "East",
            District::West => "West",
        }
    }

    pub fn from_label(s: &str) -> Option<District> {
        District::ALL.into_iter().find(|d| d.label() == s)
    }
}

/// A published listing. Only ever created whole, after moderation acceptance.
#[derive(Clone, Debug)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: Category,
    pub district: Option<District>,
    pub photo: Option<PhotoRef>,
    pub author: UserId,
    pub author_handle: String,
}

/// A fully collected draft handed to the store for commit.
#[derive(Clone, Debug)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub category: Category,
    pub district: Option<District>,
    pub photo: Option<PhotoRef>,
    pub author: UserId,
    pub author_handle: String,
}

/// Reason a user gives when reporting a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComplaintReason {
    Spam,
    Fraud,
    Abuse,
    Other,
}

impl ComplaintReason {
    pub const ALL: [ComplaintReason; 4] = [
        ComplaintReason::Spam,
        ComplaintReason::Fraud,
        ComplaintReason::Abuse,
        ComplaintReason::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComplaintReason::Spam => "Spam",
            ComplaintReason::Fraud => "Fraud",
            ComplaintReason::Abuse => "Abuse",
            ComplaintReason::Other => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplaintStatus {
    New,
    Resolved,
}

/// A report filed against a published listing.
///
/// Complaints are cascaded away when their listing is deleted.
#[derive(Clone, Debug)]
pub struct Complaint {
    pub id: ComplaintId,
    pub listing_id: ListingId,
    pub reporter: UserId,
    pub reason: ComplaintReason,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
}
