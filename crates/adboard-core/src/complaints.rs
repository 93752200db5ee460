use std::sync::Arc;

use crate::{
    domain::{ComplaintReason, ListingId, UserId},
    errors::Error,
    events::{AdminAction, Notice, Reply},
    notify::NotificationPort,
    store::ListingStore,
    Result,
};

/// Complaint lifecycle: filing by reporters, resolution by the administrator.
///
/// A complaint is `New` until the administrator resolves it, or until its
/// listing is deleted and the complaint is cascaded away.
pub struct ComplaintWorkflow {
    store: Arc<dyn ListingStore>,
    notifier: Arc<dyn NotificationPort>,
    admin: UserId,
}

impl ComplaintWorkflow {
    pub fn new(
        store: Arc<dyn ListingStore>,
        notifier: Arc<dyn NotificationPort>,
        admin: UserId,
    ) -> Self {
        Self {
            store,
            notifier,
            admin,
        }
    }

    /// File a complaint and notify the administrator with the action menu.
    pub async fn file(
        &self,
        reporter: UserId,
        listing_id: ListingId,
        reason: ComplaintReason,
    ) -> Result<Reply> {
        let Some(listing) = self.store.listing(listing_id).await? else {
            return Ok(Reply::ListingGone);
        };

        let complaint = self
            .store
            .create_complaint(listing_id, reporter, reason)
            .await?;

        // The complaint stands even if the admin alert cannot be delivered.
        if let Err(err) = self
            .notifier
            .notify(self.admin, Notice::ComplaintFiled { complaint, listing })
            .await
        {
            tracing::warn!(error = %err, listing = listing_id.0, "failed to notify administrator of complaint");
        }

        Ok(Reply::ComplaintFiled)
    }

    /// Execute an administrator action. Non-admin callers are rejected with no
    /// state change.
    pub async fn admin_action(&self, actor: UserId, action: AdminAction) -> Result<Reply> {
        if actor != self.admin {
            return Err(Error::Authorization(
                "administrator action from non-admin".to_string(),
            ));
        }

        match action {
            AdminAction::Resolve(id) => {
                if self.store.resolve_complaint(id).await? {
                    Ok(Reply::ComplaintResolved(id))
                } else {
                    // Complaint already cascaded away with its listing.
                    Ok(Reply::AlreadyDeleted)
                }
            }
            AdminAction::Ignore(id) => Ok(Reply::ComplaintIgnored(id)),
            AdminAction::DeleteListing { listing, complaint } => {
                // Snapshot reason and author before the cascade removes them.
                let reason = self
                    .store
                    .complaint(complaint)
                    .await?
                    .map(|c| c.reason)
                    .unwrap_or(ComplaintReason::Other);
                let target = self.store.listing(listing).await?;

                // The did-delete flag gates the author notification, so a
                // repeated action performs no second deletion and no second
                // notice.
                if !self.store.delete_listing(listing).await? {
                    return Ok(Reply::AlreadyDeleted);
                }

                if let Some(target) = target {
                    if let Err(err) = self
                        .notifier
                        .notify(
                            target.author,
                            Notice::ListingRemoved {
                                title: target.title,
                                reason,
                            },
                        )
                        .await
                    {
                        tracing::warn!(error = %err, listing = listing.0, "failed to notify author of removal");
                    }
                }

                Ok(Reply::ListingDeletedByAdmin(listing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, ComplaintStatus, NewListing};
    use crate::notify::test_support::RecordingNotifier;
    use crate::store::MemoryStore;

    const ADMIN: UserId = UserId(99);

    async fn setup() -> (Arc<MemoryStore>, Arc<RecordingNotifier>, ComplaintWorkflow) {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let workflow = ComplaintWorkflow::new(store.clone(), notifier.clone(), ADMIN);
        (store, notifier, workflow)
    }

    async fn listing(store: &MemoryStore) -> crate::domain::Listing {
        store
            .create_listing(NewListing {
                title: "Bike".to_string(),
                description: "Good condition".to_string(),
                price: 150,
                category: Category::Transport,
                district: None,
                photo: None,
                author: UserId(1),
                author_handle: "seller".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn filing_notifies_admin() {
        let (store, notifier, workflow) = setup().await;
        let listing = listing(&store).await;

        let reply = workflow
            .file(UserId(2), listing.id, ComplaintReason::Spam)
            .await
            .unwrap();
        assert!(matches!(reply, Reply::ComplaintFiled));

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ADMIN);
        assert!(matches!(sent[0].1, Notice::ComplaintFiled { .. }));
    }

    #[tokio::test]
    async fn non_admin_action_is_rejected_without_state_change() {
        let (store, _, workflow) = setup().await;
        let listing = listing(&store).await;
        let complaint = store
            .create_complaint(listing.id, UserId(2), ComplaintReason::Fraud)
            .await
            .unwrap();

        let err = workflow
            .admin_action(
                UserId(2),
                AdminAction::DeleteListing {
                    listing: listing.id,
                    complaint: complaint.id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
        assert!(store.listing(listing.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn resolve_marks_complaint_and_keeps_listing() {
        let (store, _, workflow) = setup().await;
        let listing = listing(&store).await;
        let complaint = store
            .create_complaint(listing.id, UserId(2), ComplaintReason::Abuse)
            .await
            .unwrap();

        let reply = workflow
            .admin_action(ADMIN, AdminAction::Resolve(complaint.id))
            .await
            .unwrap();
        assert!(matches!(reply, Reply::ComplaintResolved(_)));
        assert_eq!(
            store.complaint(complaint.id).await.unwrap().unwrap().status,
            ComplaintStatus::Resolved
        );
        assert!(store.listing(listing.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn double_delete_performs_one_deletion_and_one_author_notice() {
        let (store, notifier, workflow) = setup().await;
        let listing = listing(&store).await;
        let complaint = store
            .create_complaint(listing.id, UserId(2), ComplaintReason::Spam)
            .await
            .unwrap();
        let action = AdminAction::DeleteListing {
            listing: listing.id,
            complaint: complaint.id,
        };

        let first = workflow.admin_action(ADMIN, action).await.unwrap();
        assert!(matches!(first, Reply::ListingDeletedByAdmin(_)));

        let second = workflow.admin_action(ADMIN, action).await.unwrap();
        assert!(matches!(second, Reply::AlreadyDeleted));

        let author_notices: Vec<_> = notifier
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, n)| *u == UserId(1) && matches!(n, Notice::ListingRemoved { .. }))
            .cloned()
            .collect();
        assert_eq!(author_notices.len(), 1);
        match &author_notices[0].1 {
            Notice::ListingRemoved { title, reason } => {
                assert_eq!(title, "Bike");
                assert_eq!(*reason, ComplaintReason::Spam);
            }
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn ignore_leaves_everything_untouched() {
        let (store, _, workflow) = setup().await;
        let listing = listing(&store).await;
        let complaint = store
            .create_complaint(listing.id, UserId(2), ComplaintReason::Other)
            .await
            .unwrap();

        let reply = workflow
            .admin_action(ADMIN, AdminAction::Ignore(complaint.id))
            .await
            .unwrap();
        assert!(matches!(reply, Reply::ComplaintIgnored(_)));
        assert_eq!(
            store.complaint(complaint.id).await.unwrap().unwrap().status,
            ComplaintStatus::New
        );
    }
}
