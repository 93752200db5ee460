use crate::domain::{Category, Complaint, ComplaintId, ComplaintReason, District, Listing, ListingId, PhotoRef};

/// Inbound event from the chat transport.
///
/// Callback payloads are decoded exactly once at the transport boundary into
/// [`Selection`]; the engine never pattern-matches on raw strings.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Text(String),
    Selection(Selection),
    Media(PhotoRef),
    Cancel,
}

/// Typed selection tokens (button presses and command-equivalents).
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    /// `/start`: greet and discard any in-progress flow.
    Start,
    /// `/add` or equivalent: enter the creation flow (overwrites a live session).
    StartListing,
    Category(Category),
    District(District),
    SkipPhoto,
    /// Enter the edit flow for an owned listing.
    EditListing(ListingId),
    EditField(EditField),
    DeleteOwn(ListingId),
    ToggleFavorite(ListingId),
    ToggleSubscription(Category),
    Report(ListingId, ComplaintReason),
    Browse(BrowseScope),
    Admin(AdminAction),
}

/// The closed set of updatable listing fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    Price,
    Category,
    Photo,
}

impl EditField {
    pub const ALL: [EditField; 5] = [
        EditField::Title,
        EditField::Description,
        EditField::Price,
        EditField::Category,
        EditField::Photo,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditField::Title => "Title",
            EditField::Description => "Description",
            EditField::Price => "Price",
            EditField::Category => "Category",
            EditField::Photo => "Photo",
        }
    }
}

/// Read-only listing views.
#[derive(Clone, Debug, PartialEq)]
pub enum BrowseScope {
    All,
    ByCategory(Category),
    ByDistrict(District),
    Search(String),
    Mine,
    Favorites,
}

/// Administrator actions on a complaint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminAction {
    Resolve(ComplaintId),
    DeleteListing {
        listing: ListingId,
        complaint: ComplaintId,
    },
    Ignore(ComplaintId),
}

/// Typed reply to the invoking user. The transport renders these.
#[derive(Clone, Debug)]
pub enum Reply {
    Greeting,
    AskTitle,
    AskDescription,
    AskPrice,
    AskCategory,
    AskDistrict,
    AskPhoto,
    /// Re-prompt: empty or whitespace-only text where text was expected.
    EmptyText,
    /// Re-prompt: price input was not a string of decimal digits.
    InvalidPrice,
    Published(Listing),
    ModerationRejected,
    Cancelled,
    /// Event arrived with no matching in-progress flow; guidance, not fatal.
    NoActiveFlow,
    NotAuthorized,
    /// Persistence failed on commit/update/delete; flow was abandoned.
    StoreFailure,
    ChooseEditField(ListingId),
    AskEditValue(EditField),
    EditApplied(EditField),
    /// The referenced listing no longer exists.
    ListingGone,
    Deleted(ListingId),
    FavoriteAdded(ListingId),
    FavoriteRemoved(ListingId),
    Subscribed(Category),
    Unsubscribed(Category),
    ComplaintFiled,
    Listings(Vec<Listing>),
    NoListings,
    ComplaintResolved(ComplaintId),
    ComplaintIgnored(ComplaintId),
    ListingDeletedByAdmin(ListingId),
    /// Admin delete on an already-deleted listing: a no-op, not an error.
    AlreadyDeleted,
}

/// Cross-user notification delivered through the notification port.
#[derive(Clone, Debug)]
pub enum Notice {
    /// Sent to category subscribers after a listing is published.
    NewListing(Listing),
    /// Sent to the administrator when a complaint is filed.
    ComplaintFiled {
        complaint: Complaint,
        listing: Listing,
    },
    /// Sent to a listing's author when the administrator removes it.
    ListingRemoved {
        title: String,
        reason: ComplaintReason,
    },
}
