use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    domain::{Listing, UserId},
    events::Notice,
    store::ListingStore,
    Result,
};

/// Port for delivering cross-user notices (subscriber fanout, admin alerts,
/// author notifications). The transport adapter renders the typed notice.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify(&self, user: UserId, notice: Notice) -> Result<()>;
}

/// Notify category subscribers about a freshly published listing.
///
/// Best-effort: each delivery is independent, failures are logged and neither
/// abort the remaining deliveries nor roll back the commit. Returns the number
/// of successful deliveries.
pub async fn fan_out_new_listing(
    store: &dyn ListingStore,
    notifier: &dyn NotificationPort,
    listing: &Listing,
) -> usize {
    let subscribers = match store.subscribers(listing.category).await {
        Ok(subs) => subs,
        Err(err) => {
            tracing::warn!(error = %err, listing = listing.id.0, "subscriber lookup failed, skipping fanout");
            return 0;
        }
    };

    let mut delivered = 0;
    for user in subscribers {
        if user == listing.author {
            continue;
        }
        match notifier.notify(user, Notice::NewListing(listing.clone())).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                tracing::warn!(error = %err, user = user.0, listing = listing.id.0, "fanout delivery failed");
            }
        }
    }
    delivered
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingNotifier;
    use super::*;
    use crate::domain::{Category, NewListing};
    use crate::store::MemoryStore;

    async fn published(store: &MemoryStore, author: i64) -> Listing {
        store
            .create_listing(NewListing {
                title: "Bike".to_string(),
                description: "Good condition".to_string(),
                price: 150,
                category: Category::Transport,
                district: None,
                photo: None,
                author: UserId(author),
                author_handle: "seller".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fanout_excludes_author() {
        let store = MemoryStore::new();
        store.add_subscription(UserId(10), Category::Transport).await.unwrap();
        store.add_subscription(UserId(11), Category::Transport).await.unwrap();
        store.add_subscription(UserId(1), Category::Transport).await.unwrap();

        let listing = published(&store, 1).await;
        let notifier = RecordingNotifier::default();
        let delivered = fan_out_new_listing(&store, &notifier, &listing).await;

        assert_eq!(delivered, 2);
        let mut recipients: Vec<i64> = notifier
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|(u, _)| u.0)
            .collect();
        recipients.sort();
        assert_eq!(recipients, vec![10, 11]);
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_abort_the_rest() {
        let store = MemoryStore::new();
        store.add_subscription(UserId(10), Category::Transport).await.unwrap();
        store.add_subscription(UserId(11), Category::Transport).await.unwrap();
        store.add_subscription(UserId(12), Category::Transport).await.unwrap();

        let listing = published(&store, 1).await;
        let notifier = RecordingNotifier {
            fail_for: vec![UserId(11)],
            ..RecordingNotifier::default()
        };
        let delivered = fan_out_new_listing(&store, &notifier, &listing).await;

        assert_eq!(delivered, 2);
    }

    #[tokio::test]
    async fn no_subscribers_means_no_deliveries() {
        let store = MemoryStore::new();
        let listing = published(&store, 1).await;
        let notifier = RecordingNotifier::default();
        assert_eq!(fan_out_new_listing(&store, &notifier, &listing).await, 0);
    }
}
