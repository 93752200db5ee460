//! Rendering of typed replies and notices into Telegram HTML + keyboards.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use adboard_core::domain::{
    Category, ComplaintReason, District, Listing, ListingId, UserId,
};
use adboard_core::events::{EditField, Notice, Reply, Selection};

use crate::decode::{encode, encode_report_menu};

/// One outbound Telegram message.
#[derive(Clone, Debug)]
pub struct OutMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
    /// File id to send as a photo with `text` as caption.
    pub photo: Option<String>,
}

impl OutMessage {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            photo: None,
        }
    }

    fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
            photo: None,
        }
    }
}

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const GREETING: &str = "👋 Hi! I'm the classifieds board bot.\n\
/add — post a listing\n\
/list — browse all listings\n\
/my — your listings\n\
/fav — your favorites\n\
/subs — category subscriptions\n\
/search <keyword> — search\n\
/cancel — abort the current flow";

pub fn render_replies(viewer: UserId, replies: &[Reply]) -> Vec<OutMessage> {
    replies
        .iter()
        .flat_map(|r| render_reply(viewer, r))
        .collect()
}

fn render_reply(viewer: UserId, reply: &Reply) -> Vec<OutMessage> {
    let single = |m: OutMessage| vec![m];
    match reply {
        Reply::Greeting => single(OutMessage::text(GREETING)),
        Reply::AskTitle => single(OutMessage::with_keyboard(
            "Enter the listing title:",
            cancel_keyboard(),
        )),
        Reply::AskDescription => single(OutMessage::with_keyboard(
            "Now enter a description:",
            cancel_keyboard(),
        )),
        Reply::AskPrice => single(OutMessage::with_keyboard(
            "Enter the price (digits only):",
            cancel_keyboard(),
        )),
        Reply::AskCategory => single(OutMessage::with_keyboard(
            "Pick a category:",
            category_keyboard(|c| encode(&Selection::Category(c))),
        )),
        Reply::AskDistrict => single(OutMessage::with_keyboard(
            "Pick a district:",
            district_keyboard(),
        )),
        Reply::AskPhoto => single(OutMessage::with_keyboard(
            "Send a photo of the item, or skip:",
            skip_keyboard(),
        )),
        Reply::EmptyText => single(OutMessage::text("Text cannot be empty, try again.")),
        Reply::InvalidPrice => single(OutMessage::text(
            "Please enter the price as a whole number (digits only).",
        )),
        Reply::Published(listing) => {
            let mut out = vec![OutMessage::text("✅ Your listing is published!")];
            out.push(listing_card(viewer, listing));
            out
        }
        Reply::ModerationRejected => single(OutMessage::text(
            "🚫 Your listing did not pass moderation and was not published.",
        )),
        Reply::Cancelled => single(OutMessage::text("Cancelled. Nothing was saved.")),
        Reply::NoActiveFlow => single(OutMessage::text(
            "Nothing in progress. Use /add to post a listing or /list to browse.",
        )),
        Reply::NotAuthorized => single(OutMessage::text("⛔ You can't do that.")),
        Reply::StoreFailure => single(OutMessage::text(
            "❌ Something went wrong saving your data. Please start over.",
        )),
        Reply::ChooseEditField(id) => single(OutMessage::with_keyboard(
            "Which field do you want to change?",
            edit_field_keyboard(*id),
        )),
        Reply::AskEditValue(field) => single(ask_edit_value(*field)),
        Reply::EditApplied(field) => single(OutMessage::text(format!(
            "✅ {} updated.",
            field.label()
        ))),
        Reply::ListingGone => single(OutMessage::text("That listing no longer exists.")),
        Reply::Deleted(_) => single(OutMessage::text("🗑 Listing deleted.")),
        Reply::FavoriteAdded(_) => single(OutMessage::text("❤️ Added to favorites.")),
        Reply::FavoriteRemoved(_) => single(OutMessage::text("💔 Removed from favorites.")),
        Reply::Subscribed(c) => single(OutMessage::text(format!(
            "🔔 Subscribed to {}.",
            c.label()
        ))),
        Reply::Unsubscribed(c) => single(OutMessage::text(format!(
            "🔕 Unsubscribed from {}.",
            c.label()
        ))),
        Reply::ComplaintFiled => single(OutMessage::text(
            "Thanks, your report was sent to the moderators.",
        )),
        Reply::Listings(listings) => listings
            .iter()
            .map(|l| listing_card(viewer, l))
            .collect(),
        Reply::NoListings => single(OutMessage::text("📭 No listings here yet.")),
        Reply::ComplaintResolved(id) => single(OutMessage::text(format!(
            "Complaint #{} marked resolved.",
            id.0
        ))),
        Reply::ComplaintIgnored(id) => single(OutMessage::text(format!(
            "Complaint #{} left as is.",
            id.0
        ))),
        Reply::ListingDeletedByAdmin(id) => single(OutMessage::text(format!(
            "Listing #{} deleted; the author was notified.",
            id.0
        ))),
        Reply::AlreadyDeleted => single(OutMessage::text(
            "Already gone — nothing to do.",
        )),
    }
}

pub fn render_notice(notice: &Notice) -> OutMessage {
    match notice {
        Notice::NewListing(listing) => {
            let mut card = listing_card(listing.author, listing);
            card.text = format!(
                "🔔 New listing in {}:\n\n{}",
                listing.category.label(),
                card.text
            );
            // Subscriber view: no owner controls.
            card.keyboard = Some(viewer_keyboard(listing.id));
            card
        }
        Notice::ComplaintFiled { complaint, listing } => {
            let text = format!(
                "🚩 Complaint #{} about listing #{}\nReason: {}\n\n{}",
                complaint.id.0,
                listing.id.0,
                complaint.reason.label(),
                listing_text(listing),
            );
            OutMessage::with_keyboard(text, admin_keyboard(complaint.id, listing.id))
        }
        Notice::ListingRemoved { title, reason } => OutMessage::text(format!(
            "⚠️ Your listing \"{}\" was removed after a complaint ({}).",
            escape_html(title),
            reason.label()
        )),
    }
}

fn listing_text(listing: &Listing) -> String {
    let mut text = format!(
        "<b>{}</b>\n{}\n💰 {}\n👤 @{}",
        escape_html(&listing.title),
        escape_html(&listing.description),
        listing.price,
        escape_html(&listing.author_handle),
    );
    if let Some(district) = listing.district {
        text.push_str(&format!("\n📍 {}", district.label()));
    }
    text
}

pub fn listing_card(viewer: UserId, listing: &Listing) -> OutMessage {
    let mut rows = vec![vec![
        InlineKeyboardButton::callback(
            "❤️ Favorite",
            encode(&Selection::ToggleFavorite(listing.id)),
        ),
        InlineKeyboardButton::callback("🚩 Report", encode_report_menu(listing.id)),
    ]];
    if viewer == listing.author {
        rows.push(vec![
            InlineKeyboardButton::callback("✏️ Edit", encode(&Selection::EditListing(listing.id))),
            InlineKeyboardButton::callback("🗑 Delete", encode(&Selection::DeleteOwn(listing.id))),
        ]);
    }

    OutMessage {
        text: listing_text(listing),
        keyboard: Some(InlineKeyboardMarkup::new(rows)),
        photo: listing.photo.as_ref().map(|p| p.0.clone()),
    }
}

fn ask_edit_value(field: EditField) -> OutMessage {
    match field {
        EditField::Title => OutMessage::with_keyboard("Send the new title:", cancel_keyboard()),
        EditField::Description => {
            OutMessage::with_keyboard("Send the new description:", cancel_keyboard())
        }
        EditField::Price => {
            OutMessage::with_keyboard("Send the new price (digits only):", cancel_keyboard())
        }
        EditField::Category => OutMessage::with_keyboard(
            "Pick the new category:",
            category_keyboard(|c| encode(&Selection::Category(c))),
        ),
        EditField::Photo => {
            OutMessage::with_keyboard("Send the new photo, or skip to remove it:", skip_keyboard())
        }
    }
}

fn cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "✖ Cancel",
        "cancel".to_string(),
    )]])
}

fn category_keyboard(data: impl Fn(Category) -> String) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Category::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|c| InlineKeyboardButton::callback(c.label(), data(*c)))
                .collect()
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancel",
        "cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn subscription_keyboard() -> InlineKeyboardMarkup {
    category_keyboard(|c| encode(&Selection::ToggleSubscription(c)))
}

fn district_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = District::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|d| InlineKeyboardButton::callback(d.label(), encode(&Selection::District(*d))))
                .collect()
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancel",
        "cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

fn skip_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Skip", encode(&Selection::SkipPhoto)),
        InlineKeyboardButton::callback("✖ Cancel", "cancel".to_string()),
    ]])
}

fn edit_field_keyboard(_id: ListingId) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = EditField::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|f| InlineKeyboardButton::callback(f.label(), encode(&Selection::EditField(*f))))
                .collect()
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        "✖ Cancel",
        "cancel".to_string(),
    )]);
    InlineKeyboardMarkup::new(rows)
}

pub fn report_reason_keyboard(id: ListingId) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = ComplaintReason::ALL
        .iter()
        .map(|r| {
            vec![InlineKeyboardButton::callback(
                r.label(),
                encode(&Selection::Report(id, *r)),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn viewer_keyboard(id: ListingId) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("❤️ Favorite", encode(&Selection::ToggleFavorite(id))),
        InlineKeyboardButton::callback("🚩 Report", encode_report_menu(id)),
    ]])
}

fn admin_keyboard(
    complaint: adboard_core::domain::ComplaintId,
    listing: ListingId,
) -> InlineKeyboardMarkup {
    use adboard_core::events::AdminAction;
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ Resolve",
            encode(&Selection::Admin(AdminAction::Resolve(complaint))),
        )],
        vec![InlineKeyboardButton::callback(
            "🗑 Delete listing",
            encode(&Selection::Admin(AdminAction::DeleteListing {
                listing,
                complaint,
            })),
        )],
        vec![InlineKeyboardButton::callback(
            "🙈 Ignore",
            encode(&Selection::Admin(AdminAction::Ignore(complaint))),
        )],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use adboard_core::domain::PhotoRef;

    fn listing(author: i64) -> Listing {
        Listing {
            id: ListingId(1),
            title: "Bike <fast>".to_string(),
            description: "Good & cheap".to_string(),
            price: 150,
            category: Category::Transport,
            district: Some(District::Central),
            photo: Some(PhotoRef("file123".to_string())),
            author: UserId(author),
            author_handle: "seller".to_string(),
        }
    }

    #[test]
    fn listing_card_escapes_html_and_carries_photo() {
        let card = listing_card(UserId(2), &listing(1));
        assert!(card.text.contains("Bike &lt;fast&gt;"));
        assert!(card.text.contains("Good &amp; cheap"));
        assert_eq!(card.photo.as_deref(), Some("file123"));
        // Non-owner view has a single action row.
        assert_eq!(card.keyboard.unwrap().inline_keyboard.len(), 1);
    }

    #[test]
    fn owner_card_has_edit_and_delete_row() {
        let card = listing_card(UserId(1), &listing(1));
        assert_eq!(card.keyboard.unwrap().inline_keyboard.len(), 2);
    }

    #[test]
    fn listings_reply_renders_one_card_each() {
        let out = render_replies(
            UserId(2),
            &[Reply::Listings(vec![listing(1), listing(1)])],
        );
        assert_eq!(out.len(), 2);
    }
}
