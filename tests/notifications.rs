mod common;

use std::sync::Arc;

use async_trait::async_trait;
use siopao_storefront::notify::{LogTransport, MailError, MailTransport, Notification, Notifier};
use uuid::Uuid;

use common::{ChannelTransport, next_mail};

struct FailingTransport;

#[async_trait]
impl MailTransport for FailingTransport {
    async fn deliver(&self, _notification: &Notification) -> Result<(), MailError> {
        Err(MailError("smtp down".to_string()))
    }
}

#[tokio::test]
async fn notifications_reach_the_transport_in_order() {
    let (transport, mut rx) = ChannelTransport::new();
    let (notifier, _worker) = Notifier::spawn(Arc::new(transport));
    let order_id = Uuid::new_v4();

    notifier.send_password_reset("a@example.com", "http://x/reset?token=t");
    notifier.send_order_status_update("b@example.com", order_id, "Shipped", "On its way");

    assert_eq!(
        next_mail(&mut rx).await,
        Notification::PasswordReset {
            to: "a@example.com".to_string(),
            reset_url: "http://x/reset?token=t".to_string(),
        }
    );
    let second = next_mail(&mut rx).await;
    assert_eq!(second.kind(), "order_status_update");
    assert_eq!(second.recipient(), "b@example.com");
}

#[tokio::test]
async fn transport_failure_does_not_stop_the_worker() {
    let (notifier, worker) = Notifier::spawn(Arc::new(FailingTransport));

    notifier.send_verification("c@example.com", "http://x/verify?token=t");
    notifier.send_verification("d@example.com", "http://x/verify?token=u");

    drop(notifier);
    worker.await.expect("worker exits cleanly once senders are gone");
}

#[tokio::test]
async fn full_queue_drops_instead_of_blocking() {
    let (notifier, worker) = Notifier::spawn_with_capacity(Arc::new(LogTransport), 1);

    for i in 0..50 {
        notifier.send_verification(&format!("user{i}@example.com"), "http://x/verify");
    }

    drop(notifier);
    worker.await.expect("worker exits cleanly");
}
