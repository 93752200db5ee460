use std::sync::Arc;

use crate::{
    complaints::ComplaintWorkflow,
    domain::{Actor, NewListing, PhotoRef, UserId},
    errors::Error,
    events::{BrowseScope, EditField, Event, Reply, Selection},
    moderation::{ModerationGate, Verdict},
    notify::{fan_out_new_listing, NotificationPort},
    session::{DialogState, ListingDraft, Session, SessionManager, UserLocks},
    store::{FieldUpdate, ListingStore},
    Result,
};

/// The per-user dialogue engine.
///
/// One inbound event per user is processed at a time (a keyed lock queues the
/// next); events for different users run concurrently. `handle_event` never
/// fails from the transport's perspective: every failure is scoped to the
/// interaction that caused it and mapped to a reply.
pub struct Engine {
    sessions: SessionManager,
    store: Arc<dyn ListingStore>,
    gate: ModerationGate,
    notifier: Arc<dyn NotificationPort>,
    complaints: ComplaintWorkflow,
    locks: UserLocks,
}

impl Engine {
    pub fn new(
        admin: UserId,
        store: Arc<dyn ListingStore>,
        gate: ModerationGate,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            sessions: SessionManager::default(),
            complaints: ComplaintWorkflow::new(store.clone(), notifier.clone(), admin),
            store,
            gate,
            notifier,
            locks: UserLocks::default(),
        }
    }

    pub async fn handle_event(&self, actor: &Actor, event: Event) -> Vec<Reply> {
        let _guard = self.locks.lock_user(actor.id).await;

        match self.dispatch(actor, event).await {
            Ok(replies) => replies,
            Err(Error::Authorization(reason)) => {
                tracing::info!(user = actor.id.0, %reason, "action denied");
                vec![Reply::NotAuthorized]
            }
            Err(Error::NoActiveSession) => vec![Reply::NoActiveFlow],
            Err(err) => {
                tracing::warn!(user = actor.id.0, error = %err, "store failure, clearing session");
                self.sessions.clear(actor.id).await;
                vec![Reply::StoreFailure]
            }
        }
    }

    async fn dispatch(&self, actor: &Actor, event: Event) -> Result<Vec<Reply>> {
        match event {
            Event::Cancel => {
                if self.sessions.clear(actor.id).await {
                    Ok(vec![Reply::Cancelled])
                } else {
                    Ok(vec![Reply::NoActiveFlow])
                }
            }
            Event::Text(text) => self.on_text(actor, text).await,
            Event::Media(photo) => self.on_media(actor, photo).await,
            Event::Selection(sel) => self.on_selection(actor, sel).await,
        }
    }

    async fn on_text(&self, actor: &Actor, text: String) -> Result<Vec<Reply>> {
        let Some(session) = self.sessions.get(actor.id).await else {
            return Ok(vec![Reply::NoActiveFlow]);
        };

        match session.state {
            DialogState::Title => {
                if text.trim().is_empty() {
                    return Ok(vec![Reply::EmptyText]);
                }
                self.sessions
                    .update(actor.id, |s| {
                        // Stored verbatim.
                        s.draft.title = Some(text);
                        s.state = DialogState::Description;
                    })
                    .await?;
                Ok(vec![Reply::AskDescription])
            }
            DialogState::Description => {
                if text.trim().is_empty() {
                    return Ok(vec![Reply::EmptyText]);
                }
                self.sessions
                    .update(actor.id, |s| {
                        s.draft.description = Some(text);
                        s.state = DialogState::Price;
                    })
                    .await?;
                Ok(vec![Reply::AskPrice])
            }
            DialogState::Price => {
                let Some(price) = parse_price(&text) else {
                    return Ok(vec![Reply::InvalidPrice]);
                };
                self.sessions
                    .update(actor.id, |s| {
                        s.draft.price = Some(price);
                        s.state = DialogState::Category;
                    })
                    .await?;
                Ok(vec![Reply::AskCategory])
            }
            // Selection UI is exclusive; stray text carries no meaning here.
            DialogState::Category | DialogState::District | DialogState::ChoosingField => {
                Ok(vec![])
            }
            DialogState::Photo => Ok(vec![Reply::AskPhoto]),
            DialogState::EditingTitle => {
                if text.trim().is_empty() {
                    return Ok(vec![Reply::EmptyText]);
                }
                self.apply_edit(actor, &session, EditField::Title, FieldUpdate::Title(text))
                    .await
            }
            DialogState::EditingDescription => {
                if text.trim().is_empty() {
                    return Ok(vec![Reply::EmptyText]);
                }
                self.apply_edit(
                    actor,
                    &session,
                    EditField::Description,
                    FieldUpdate::Description(text),
                )
                .await
            }
            DialogState::EditingPrice => {
                let Some(price) = parse_price(&text) else {
                    return Ok(vec![Reply::InvalidPrice]);
                };
                self.apply_edit(actor, &session, EditField::Price, FieldUpdate::Price(price))
                    .await
            }
            DialogState::EditingCategory => Ok(vec![]),
            DialogState::EditingPhoto => Ok(vec![Reply::AskPhoto]),
        }
    }

    async fn on_media(&self, actor: &Actor, photo: PhotoRef) -> Result<Vec<Reply>> {
        let Some(session) = self.sessions.get(actor.id).await else {
            return Ok(vec![Reply::NoActiveFlow]);
        };

        match session.state {
            DialogState::Photo => self.submit(actor, session, Some(photo)).await,
            DialogState::EditingPhoto => {
                self.apply_edit(
                    actor,
                    &session,
                    EditField::Photo,
                    FieldUpdate::Photo(Some(photo)),
                )
                .await
            }
            _ => Ok(vec![]),
        }
    }

    async fn on_selection(&self, actor: &Actor, sel: Selection) -> Result<Vec<Reply>> {
        match sel {
            Selection::Start => {
                self.sessions.clear(actor.id).await;
                Ok(vec![Reply::Greeting])
            }
            Selection::StartListing => {
                // Overwrite, not merge: a prior session is discarded.
                self.sessions.start(actor.id, DialogState::Title).await;
                Ok(vec![Reply::AskTitle])
            }
            Selection::Category(category) => {
                let Some(session) = self.sessions.get(actor.id).await else {
                    return Ok(vec![]);
                };
                match session.state {
                    DialogState::Category => {
                        self.sessions
                            .update(actor.id, |s| {
                                s.draft.category = Some(category);
                                s.state = DialogState::District;
                            })
                            .await?;
                        Ok(vec![Reply::AskDistrict])
                    }
                    DialogState::EditingCategory => {
                        self.apply_edit(
                            actor,
                            &session,
                            EditField::Category,
                            FieldUpdate::Category(category),
                        )
                        .await
                    }
                    _ => Ok(vec![]),
                }
            }
            Selection::District(district) => {
                let Some(session) = self.sessions.get(actor.id).await else {
                    return Ok(vec![]);
                };
                if session.state != DialogState::District {
                    return Ok(vec![]);
                }
                self.sessions
                    .update(actor.id, |s| {
                        s.draft.district = Some(district);
                        s.state = DialogState::Photo;
                    })
                    .await?;
                Ok(vec![Reply::AskPhoto])
            }
            Selection::SkipPhoto => {
                let Some(session) = self.sessions.get(actor.id).await else {
                    return Ok(vec![]);
                };
                match session.state {
                    DialogState::Photo => self.submit(actor, session, None).await,
                    DialogState::EditingPhoto => {
                        self.apply_edit(actor, &session, EditField::Photo, FieldUpdate::Photo(None))
                            .await
                    }
                    _ => Ok(vec![]),
                }
            }
            Selection::EditListing(id) => {
                let Some(listing) = self.store.listing(id).await? else {
                    return Ok(vec![Reply::ListingGone]);
                };
                // Ownership is checked before entering the edit flow.
                if listing.author != actor.id {
                    return Err(Error::Authorization(
                        "edit of a listing owned by another user".to_string(),
                    ));
                }
                self.sessions
                    .start(actor.id, DialogState::ChoosingField)
                    .await;
                self.sessions
                    .update(actor.id, |s| s.edit_target = Some(id))
                    .await?;
                Ok(vec![Reply::ChooseEditField(id)])
            }
            Selection::EditField(field) => {
                let Some(session) = self.sessions.get(actor.id).await else {
                    return Ok(vec![]);
                };
                if session.state != DialogState::ChoosingField {
                    return Ok(vec![]);
                }
                let next = match field {
                    EditField::Title => DialogState::EditingTitle,
                    EditField::Description => DialogState::EditingDescription,
                    EditField::Price => DialogState::EditingPrice,
                    EditField::Category => DialogState::EditingCategory,
                    EditField::Photo => DialogState::EditingPhoto,
                };
                self.sessions.update(actor.id, |s| s.state = next).await?;
                Ok(vec![Reply::AskEditValue(field)])
            }
            Selection::DeleteOwn(id) => {
                let Some(listing) = self.store.listing(id).await? else {
                    return Ok(vec![Reply::ListingGone]);
                };
                if listing.author != actor.id {
                    return Err(Error::Authorization(
                        "delete of a listing owned by another user".to_string(),
                    ));
                }
                self.store.delete_listing(id).await?;
                Ok(vec![Reply::Deleted(id)])
            }
            Selection::ToggleFavorite(id) => {
                if self.store.listing(id).await?.is_none() {
                    return Ok(vec![Reply::ListingGone]);
                }
                if self.store.add_favorite(actor.id, id).await? {
                    Ok(vec![Reply::FavoriteAdded(id)])
                } else {
                    self.store.remove_favorite(actor.id, id).await?;
                    Ok(vec![Reply::FavoriteRemoved(id)])
                }
            }
            Selection::ToggleSubscription(category) => {
                if self.store.add_subscription(actor.id, category).await? {
                    Ok(vec![Reply::Subscribed(category)])
                } else {
                    self.store.remove_subscription(actor.id, category).await?;
                    Ok(vec![Reply::Unsubscribed(category)])
                }
            }
            Selection::Report(id, reason) => {
                Ok(vec![self.complaints.file(actor.id, id, reason).await?])
            }
            Selection::Browse(scope) => self.browse(actor, scope).await,
            Selection::Admin(action) => {
                Ok(vec![self.complaints.admin_action(actor.id, action).await?])
            }
        }
    }

    async fn browse(&self, actor: &Actor, scope: BrowseScope) -> Result<Vec<Reply>> {
        let listings = match scope {
            BrowseScope::All => self.store.listings().await?,
            BrowseScope::ByCategory(c) => self.store.listings_by_category(c).await?,
            BrowseScope::ByDistrict(d) => self.store.listings_by_district(d).await?,
            BrowseScope::Search(keyword) => self.store.search(&keyword).await?,
            BrowseScope::Mine => self.store.listings_by_author(actor.id).await?,
            BrowseScope::Favorites => self.store.favorites(actor.id).await?,
        };
        if listings.is_empty() {
            Ok(vec![Reply::NoListings])
        } else {
            Ok(vec![Reply::Listings(listings)])
        }
    }

    /// Final step of the creation flow: moderate, then commit and fan out.
    ///
    /// The moderation step is not user-visible; the session is cleared on both
    /// outcomes, and a failed commit is not resumable.
    async fn submit(
        &self,
        actor: &Actor,
        mut session: Session,
        photo: Option<PhotoRef>,
    ) -> Result<Vec<Reply>> {
        session.draft.photo = photo;

        let verdict = self.gate.moderate(&session.draft).await;
        self.sessions.clear(actor.id).await;

        if verdict == Verdict::Rejected {
            return Ok(vec![Reply::ModerationRejected]);
        }

        let new = complete_draft(actor, session.draft)?;
        let listing = self.store.create_listing(new).await?;
        fan_out_new_listing(self.store.as_ref(), self.notifier.as_ref(), &listing).await;
        Ok(vec![Reply::Published(listing)])
    }

    /// Terminal edit step: one field update against the store, session cleared.
    async fn apply_edit(
        &self,
        actor: &Actor,
        session: &Session,
        field: EditField,
        update: FieldUpdate,
    ) -> Result<Vec<Reply>> {
        let target = session.edit_target.ok_or(Error::NoActiveSession)?;
        self.sessions.clear(actor.id).await;
        if self.store.update_field(target, update).await? {
            Ok(vec![Reply::EditApplied(field)])
        } else {
            Ok(vec![Reply::ListingGone])
        }
    }
}

/// A price is a non-empty string of decimal digits, nothing else.
fn parse_price(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<u64>().ok()
}

fn complete_draft(actor: &Actor, draft: ListingDraft) -> Result<NewListing> {
    let (Some(title), Some(description), Some(price), Some(category)) = (
        draft.title,
        draft.description,
        draft.price,
        draft.category,
    ) else {
        // Unreachable through the state machine; kept as a hard guard so a
        // partially collected draft can never reach the store.
        return Err(Error::External("incomplete draft at submit".to_string()));
    };
    Ok(NewListing {
        title,
        description,
        price,
        category,
        district: draft.district,
        photo: draft.photo,
        author: actor.id,
        author_handle: actor.handle.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ComplaintReason, District, ListingId};
    use crate::events::AdminAction;
    use crate::moderation::ModerationClient;
    use crate::notify::test_support::RecordingNotifier;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use std::time::Duration;

    const ADMIN: UserId = UserId(99);

    struct FixedClient {
        response: Result<String>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl ModerationClient for FixedClient {
        async fn classify(&self, _instruction: &str, _submission: &str) -> Result<String> {
            if let Some(d) = self.delay {
                tokio::time::sleep(d).await;
            }
            match &self.response {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(Error::External("moderation transport error".to_string())),
            }
        }
    }

    struct Harness {
        engine: Engine,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness_with_gate(client: FixedClient, timeout: Duration) -> Harness {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = Engine::new(
            ADMIN,
            store.clone(),
            ModerationGate::new(Arc::new(client), timeout),
            notifier.clone(),
        );
        Harness {
            engine,
            store,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with_gate(
            FixedClient {
                response: Ok("ok".to_string()),
                delay: None,
            },
            Duration::from_secs(1),
        )
    }

    fn actor(id: i64) -> Actor {
        Actor {
            id: UserId(id),
            handle: format!("user{id}"),
        }
    }

    async fn drive_creation(h: &Harness, user: &Actor) -> Vec<Reply> {
        h.engine
            .handle_event(user, Event::Selection(Selection::StartListing))
            .await;
        h.engine
            .handle_event(user, Event::Text("Bike".to_string()))
            .await;
        h.engine
            .handle_event(user, Event::Text("Good condition".to_string()))
            .await;
        h.engine
            .handle_event(user, Event::Text("150".to_string()))
            .await;
        h.engine
            .handle_event(
                user,
                Event::Selection(Selection::Category(Category::Transport)),
            )
            .await;
        h.engine
            .handle_event(
                user,
                Event::Selection(Selection::District(District::Central)),
            )
            .await;
        h.engine
            .handle_event(user, Event::Selection(Selection::SkipPhoto))
            .await
    }

    #[tokio::test]
    async fn creation_flow_persists_exactly_the_supplied_values() {
        let h = harness();
        let user = actor(1);

        let replies = drive_creation(&h, &user).await;
        assert!(matches!(replies[0], Reply::Published(_)));

        let listings = h.store.listings().await.unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.title, "Bike");
        assert_eq!(listing.description, "Good condition");
        assert_eq!(listing.price, 150);
        assert_eq!(listing.category, Category::Transport);
        assert_eq!(listing.district, Some(District::Central));
        assert!(listing.photo.is_none());
        assert_eq!(listing.author, UserId(1));

        // Session cleared: follow-up text has no flow to land in.
        let after = h
            .engine
            .handle_event(&user, Event::Text("stray".to_string()))
            .await;
        assert!(matches!(after[0], Reply::NoActiveFlow));
    }

    #[tokio::test]
    async fn moderation_timeout_rejects_and_persists_nothing() {
        let h = harness_with_gate(
            FixedClient {
                response: Ok("ok".to_string()),
                delay: Some(Duration::from_millis(50)),
            },
            Duration::from_millis(5),
        );
        let user = actor(1);

        let replies = drive_creation(&h, &user).await;
        assert!(matches!(replies[0], Reply::ModerationRejected));
        assert_eq!(h.store.counts().await.unwrap().listings, 0);
        assert!(h.engine.sessions.get(user.id).await.is_none());
    }

    #[tokio::test]
    async fn moderation_transport_error_rejects() {
        let h = harness_with_gate(
            FixedClient {
                response: Err(Error::External("x".to_string())),
                delay: None,
            },
            Duration::from_secs(1),
        );
        let user = actor(1);

        let replies = drive_creation(&h, &user).await;
        assert!(matches!(replies[0], Reply::ModerationRejected));
        assert_eq!(h.store.counts().await.unwrap().listings, 0);
    }

    #[tokio::test]
    async fn non_digit_price_never_transitions() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;
        h.engine
            .handle_event(&user, Event::Text("Bike".to_string()))
            .await;
        h.engine
            .handle_event(&user, Event::Text("Good condition".to_string()))
            .await;

        for bad in ["12a", "-5", "1.5", " 150", "", "12 34"] {
            let replies = h
                .engine
                .handle_event(&user, Event::Text(bad.to_string()))
                .await;
            assert!(
                matches!(replies[0], Reply::InvalidPrice),
                "input {bad:?} must re-prompt"
            );
            let session = h.engine.sessions.get(user.id).await.unwrap();
            assert_eq!(session.state, DialogState::Price, "input {bad:?}");
        }

        let replies = h
            .engine
            .handle_event(&user, Event::Text("0150".to_string()))
            .await;
        assert!(matches!(replies[0], Reply::AskCategory));
        let session = h.engine.sessions.get(user.id).await.unwrap();
        assert_eq!(session.draft.price, Some(150));
    }

    #[tokio::test]
    async fn empty_text_reprompts_without_transition() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;

        let replies = h
            .engine
            .handle_event(&user, Event::Text("   ".to_string()))
            .await;
        assert!(matches!(replies[0], Reply::EmptyText));
        let session = h.engine.sessions.get(user.id).await.unwrap();
        assert_eq!(session.state, DialogState::Title);
    }

    #[tokio::test]
    async fn cancel_discards_draft_without_store_writes() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;
        h.engine
            .handle_event(&user, Event::Text("Bike".to_string()))
            .await;

        let replies = h.engine.handle_event(&user, Event::Cancel).await;
        assert!(matches!(replies[0], Reply::Cancelled));
        assert_eq!(h.store.counts().await.unwrap(), Default::default());
        assert!(h.engine.sessions.get(user.id).await.is_none());
    }

    #[tokio::test]
    async fn stray_selection_in_text_state_is_ignored() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;

        let replies = h
            .engine
            .handle_event(
                &user,
                Event::Selection(Selection::Category(Category::Other)),
            )
            .await;
        assert!(replies.is_empty());
        let session = h.engine.sessions.get(user.id).await.unwrap();
        assert_eq!(session.state, DialogState::Title);
        assert!(session.draft.category.is_none());
    }

    #[tokio::test]
    async fn reentering_add_discards_prior_draft() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;
        h.engine
            .handle_event(&user, Event::Text("Old title".to_string()))
            .await;

        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;
        let session = h.engine.sessions.get(user.id).await.unwrap();
        assert_eq!(session.state, DialogState::Title);
        assert!(session.draft.title.is_none());
    }

    #[tokio::test]
    async fn editing_anothers_listing_is_denied_before_choosing_field() {
        let h = harness();
        let owner = actor(1);
        drive_creation(&h, &owner).await;
        let listing_id = h.store.listings().await.unwrap()[0].id;

        let intruder = actor(2);
        let replies = h
            .engine
            .handle_event(&intruder, Event::Selection(Selection::EditListing(listing_id)))
            .await;
        assert!(matches!(replies[0], Reply::NotAuthorized));
        assert!(h.engine.sessions.get(intruder.id).await.is_none());
    }

    #[tokio::test]
    async fn edit_flow_replaces_a_single_field() {
        let h = harness();
        let owner = actor(1);
        drive_creation(&h, &owner).await;
        let listing_id = h.store.listings().await.unwrap()[0].id;

        let replies = h
            .engine
            .handle_event(&owner, Event::Selection(Selection::EditListing(listing_id)))
            .await;
        assert!(matches!(replies[0], Reply::ChooseEditField(_)));

        h.engine
            .handle_event(&owner, Event::Selection(Selection::EditField(EditField::Price)))
            .await;
        let replies = h
            .engine
            .handle_event(&owner, Event::Text("200".to_string()))
            .await;
        assert!(matches!(replies[0], Reply::EditApplied(EditField::Price)));

        let listing = h.store.listing(listing_id).await.unwrap().unwrap();
        assert_eq!(listing.price, 200);
        assert_eq!(listing.title, "Bike");
        assert!(h.engine.sessions.get(owner.id).await.is_none());
    }

    #[tokio::test]
    async fn favorite_toggle_round_trip() {
        let h = harness();
        let owner = actor(1);
        drive_creation(&h, &owner).await;
        let listing_id = h.store.listings().await.unwrap()[0].id;

        let other = actor(2);
        let replies = h
            .engine
            .handle_event(&other, Event::Selection(Selection::ToggleFavorite(listing_id)))
            .await;
        assert!(matches!(replies[0], Reply::FavoriteAdded(_)));

        let replies = h
            .engine
            .handle_event(&other, Event::Selection(Selection::ToggleFavorite(listing_id)))
            .await;
        assert!(matches!(replies[0], Reply::FavoriteRemoved(_)));
        assert_eq!(h.store.counts().await.unwrap().favorites, 0);
    }

    #[tokio::test]
    async fn publication_fans_out_to_subscribers_except_author() {
        let h = harness();
        h.store
            .add_subscription(UserId(10), Category::Transport)
            .await
            .unwrap();
        h.store
            .add_subscription(UserId(1), Category::Transport)
            .await
            .unwrap();

        drive_creation(&h, &actor(1)).await;

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, UserId(10));
    }

    #[tokio::test]
    async fn admin_action_from_engine_requires_admin() {
        let h = harness();
        let owner = actor(1);
        drive_creation(&h, &owner).await;
        let listing_id = h.store.listings().await.unwrap()[0].id;
        h.engine
            .handle_event(
                &actor(2),
                Event::Selection(Selection::Report(listing_id, ComplaintReason::Spam)),
            )
            .await;
        let complaint_id = h.store.open_complaints().await.unwrap()[0].id;

        let replies = h
            .engine
            .handle_event(
                &actor(2),
                Event::Selection(Selection::Admin(AdminAction::Resolve(complaint_id))),
            )
            .await;
        assert!(matches!(replies[0], Reply::NotAuthorized));

        let admin = Actor {
            id: ADMIN,
            handle: "admin".to_string(),
        };
        let replies = h
            .engine
            .handle_event(
                &admin,
                Event::Selection(Selection::Admin(AdminAction::Resolve(complaint_id))),
            )
            .await;
        assert!(matches!(replies[0], Reply::ComplaintResolved(_)));
    }

    #[tokio::test]
    async fn browse_scopes_filter_listings() {
        let h = harness();
        drive_creation(&h, &actor(1)).await;

        let replies = h
            .engine
            .handle_event(&actor(2), Event::Selection(Selection::Browse(BrowseScope::All)))
            .await;
        assert!(matches!(&replies[0], Reply::Listings(l) if l.len() == 1));

        let replies = h
            .engine
            .handle_event(
                &actor(2),
                Event::Selection(Selection::Browse(BrowseScope::Search("bike".to_string()))),
            )
            .await;
        assert!(matches!(&replies[0], Reply::Listings(l) if l.len() == 1));

        let replies = h
            .engine
            .handle_event(
                &actor(2),
                Event::Selection(Selection::Browse(BrowseScope::ByCategory(Category::Services))),
            )
            .await;
        assert!(matches!(replies[0], Reply::NoListings));

        let replies = h
            .engine
            .handle_event(&actor(2), Event::Selection(Selection::Browse(BrowseScope::Mine)))
            .await;
        assert!(matches!(replies[0], Reply::NoListings));
    }

    #[tokio::test]
    async fn unknown_listing_actions_answer_listing_gone() {
        let h = harness();
        let user = actor(1);
        for sel in [
            Selection::EditListing(ListingId(7)),
            Selection::DeleteOwn(ListingId(7)),
            Selection::ToggleFavorite(ListingId(7)),
            Selection::Report(ListingId(7), ComplaintReason::Spam),
        ] {
            let replies = h.engine.handle_event(&user, Event::Selection(sel)).await;
            assert!(matches!(replies[0], Reply::ListingGone));
        }
    }

    #[tokio::test]
    async fn start_clears_any_active_flow() {
        let h = harness();
        let user = actor(1);
        h.engine
            .handle_event(&user, Event::Selection(Selection::StartListing))
            .await;
        let replies = h
            .engine
            .handle_event(&user, Event::Selection(Selection::Start))
            .await;
        assert!(matches!(replies[0], Reply::Greeting));
        assert!(h.engine.sessions.get(user.id).await.is_none());
    }
}
