//! Callback payload codec.
//!
//! Payloads are decoded exactly once, here, into the typed event union; the
//! engine never sees raw strings. `encode` is the only place payloads are
//! produced, so the two sides cannot drift apart.

use adboard_core::domain::{Category, ComplaintId, ComplaintReason, District, ListingId};
use adboard_core::events::{AdminAction, BrowseScope, EditField, Event, Selection};

/// Adapter-local actions that never reach the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Engine(Event),
    /// Show the complaint-reason menu for a listing.
    ReportMenu(ListingId),
}

pub fn encode(sel: &Selection) -> String {
    match sel {
        Selection::Start => "start".to_string(),
        Selection::StartListing => "add".to_string(),
        Selection::Category(c) => format!("cat:{}", c.label()),
        Selection::District(d) => format!("dist:{}", d.label()),
        Selection::SkipPhoto => "skip".to_string(),
        Selection::EditListing(id) => format!("edit:{}", id.0),
        Selection::EditField(f) => format!("field:{}", f.label()),
        Selection::DeleteOwn(id) => format!("del:{}", id.0),
        Selection::ToggleFavorite(id) => format!("fav:{}", id.0),
        Selection::ToggleSubscription(c) => format!("sub:{}", c.label()),
        Selection::Report(id, reason) => format!("rep:{}:{}", id.0, reason.label()),
        Selection::Browse(_) => "list".to_string(),
        Selection::Admin(AdminAction::Resolve(c)) => format!("adm:res:{}", c.0),
        Selection::Admin(AdminAction::Ignore(c)) => format!("adm:ign:{}", c.0),
        Selection::Admin(AdminAction::DeleteListing { listing, complaint }) => {
            format!("adm:del:{}:{}", listing.0, complaint.0)
        }
    }
}

pub fn encode_report_menu(id: ListingId) -> String {
    format!("repmenu:{}", id.0)
}

pub fn decode(data: &str) -> Option<Decoded> {
    if data == "cancel" {
        return Some(Decoded::Engine(Event::Cancel));
    }
    let sel = match data {
        "start" => Some(Selection::Start),
        "add" => Some(Selection::StartListing),
        "skip" => Some(Selection::SkipPhoto),
        // Keyboards only ever link the unfiltered view; scoped browses come
        // in as commands.
        "list" => Some(Selection::Browse(BrowseScope::All)),
        _ => None,
    };
    if let Some(sel) = sel {
        return Some(Decoded::Engine(Event::Selection(sel)));
    }

    let (tag, rest) = data.split_once(':')?;
    let sel = match tag {
        "cat" => Selection::Category(Category::from_label(rest)?),
        "dist" => Selection::District(District::from_label(rest)?),
        "edit" => Selection::EditListing(ListingId(rest.parse().ok()?)),
        "field" => Selection::EditField(field_from_label(rest)?),
        "del" => Selection::DeleteOwn(ListingId(rest.parse().ok()?)),
        "fav" => Selection::ToggleFavorite(ListingId(rest.parse().ok()?)),
        "sub" => Selection::ToggleSubscription(Category::from_label(rest)?),
        "repmenu" => return Some(Decoded::ReportMenu(ListingId(rest.parse().ok()?))),
        "rep" => {
            let (id, reason) = rest.split_once(':')?;
            Selection::Report(
                ListingId(id.parse().ok()?),
                reason_from_label(reason)?,
            )
        }
        "adm" => {
            let (action, rest) = rest.split_once(':')?;
            let admin = match action {
                "res" => AdminAction::Resolve(ComplaintId(rest.parse().ok()?)),
                "ign" => AdminAction::Ignore(ComplaintId(rest.parse().ok()?)),
                "del" => {
                    let (listing, complaint) = rest.split_once(':')?;
                    AdminAction::DeleteListing {
                        listing: ListingId(listing.parse().ok()?),
                        complaint: ComplaintId(complaint.parse().ok()?),
                    }
                }
                _ => return None,
            };
            Selection::Admin(admin)
        }
        _ => return None,
    };
    Some(Decoded::Engine(Event::Selection(sel)))
}

fn field_from_label(s: &str) -> Option<EditField> {
    EditField::ALL.into_iter().find(|f| f.label() == s)
}

fn reason_from_label(s: &str) -> Option<ComplaintReason> {
    ComplaintReason::ALL.into_iter().find(|r| r.label() == s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selections_round_trip() {
        let samples = vec![
            Selection::Start,
            Selection::StartListing,
            Selection::SkipPhoto,
            Selection::Category(Category::Electronics),
            Selection::District(District::West),
            Selection::EditListing(ListingId(7)),
            Selection::EditField(EditField::Photo),
            Selection::DeleteOwn(ListingId(12)),
            Selection::ToggleFavorite(ListingId(3)),
            Selection::ToggleSubscription(Category::Transport),
            Selection::Report(ListingId(5), ComplaintReason::Fraud),
            Selection::Admin(AdminAction::Resolve(ComplaintId(2))),
            Selection::Admin(AdminAction::Ignore(ComplaintId(4))),
            Selection::Admin(AdminAction::DeleteListing {
                listing: ListingId(5),
                complaint: ComplaintId(6),
            }),
        ];
        for sel in samples {
            let data = encode(&sel);
            match decode(&data) {
                Some(Decoded::Engine(Event::Selection(back))) => {
                    assert_eq!(back, sel, "payload {data:?}")
                }
                other => panic!("payload {data:?} decoded to {other:?}"),
            }
        }
    }

    #[test]
    fn report_menu_and_cancel_decode() {
        assert_eq!(
            decode(&encode_report_menu(ListingId(9))),
            Some(Decoded::ReportMenu(ListingId(9)))
        );
        assert!(matches!(decode("cancel"), Some(Decoded::Engine(Event::Cancel))));
    }

    #[test]
    fn garbage_payloads_decode_to_none() {
        for data in ["", "x", "cat:Nope", "edit:abc", "adm:zap:1", "rep:1", "fav:"] {
            assert_eq!(decode(data), None, "payload {data:?}");
        }
    }
}
