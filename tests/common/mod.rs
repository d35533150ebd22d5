// Shared fixtures for integration tests: an in-memory database with the full
// schema, plus fake media host and mail transport.
#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use siopao_storefront::{
    config::AdminSeed,
    entity::{
        AuditLogs, Categories, InventoryCategories, InventoryItems, OrderItems, Orders,
        Products, RecipeIngredients, RolePermissions, Roles, UnitsOfMeasure, Users,
    },
    media::{FileStorage, MediaHost, MediaHostError, UploadedAsset},
    middleware::auth::AuthUser,
    notify::{MailError, MailTransport, Notification, Notifier},
    permissions::{Permission, ROLE_OWNER},
    state::{AppState, AuthSettings},
};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const TEST_FOLDER: &str = "mk-toasted-demo";

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(entity);
    db.execute(backend.build(&stmt))
        .await
        .expect("Failed to create table");
}

/// Creates an in-memory database with every table the app uses.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    create_table(&db, Roles).await;
    create_table(&db, RolePermissions).await;
    create_table(&db, Users).await;
    create_table(&db, InventoryCategories).await;
    create_table(&db, UnitsOfMeasure).await;
    create_table(&db, InventoryItems).await;
    create_table(&db, Categories).await;
    create_table(&db, Products).await;
    create_table(&db, RecipeIngredients).await;
    create_table(&db, Orders).await;
    create_table(&db, OrderItems).await;
    create_table(&db, AuditLogs).await;

    db
}

pub fn admin_seed() -> AdminSeed {
    AdminSeed {
        username: "admin".to_string(),
        password: "admin-password".to_string(),
    }
}

/// Media host double that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeHost {
    pub uploads: Mutex<Vec<(usize, String)>>,
    pub destroyed: Mutex<Vec<String>>,
    pub fail_upload: bool,
    pub fail_destroy: bool,
    counter: AtomicUsize,
}

impl FakeHost {
    pub fn failing_uploads() -> Self {
        Self {
            fail_upload: true,
            ..Self::default()
        }
    }

    pub fn failing_destroys() -> Self {
        Self {
            fail_destroy: true,
            ..Self::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaHost for FakeHost {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedAsset, MediaHostError> {
        self.uploads
            .lock()
            .unwrap()
            .push((bytes.len(), folder.to_string()));
        if self.fail_upload {
            return Err(MediaHostError::Status {
                status: 500,
                body: "boom".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("{folder}/image-{n}");
        Ok(UploadedAsset {
            secure_url: format!("https://res.cloudinary.com/demo/image/upload/v170000000{n}/{public_id}.jpg"),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaHostError> {
        self.destroyed.lock().unwrap().push(public_id.to_string());
        if self.fail_destroy {
            return Err(MediaHostError::Decode("not ok".to_string()));
        }
        Ok(())
    }
}

/// Mail transport that forwards every delivered notification to a channel.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MailTransport for ChannelTransport {
    async fn deliver(&self, notification: &Notification) -> Result<(), MailError> {
        self.tx
            .send(notification.clone())
            .map_err(|e| MailError(e.to_string()))
    }
}

/// Waits briefly for the next delivered notification.
pub async fn next_mail(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Notification {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for notification")
        .expect("notification channel closed")
}

pub struct TestApp {
    pub state: AppState,
    pub host: Arc<FakeHost>,
    pub mail: mpsc::UnboundedReceiver<Notification>,
}

pub async fn test_app_with_host(host: FakeHost) -> TestApp {
    let db = setup_test_db().await;
    let host = Arc::new(host);
    let (transport, mail) = ChannelTransport::new();
    let (notifier, _worker) = Notifier::spawn(Arc::new(transport));

    let state = AppState {
        orm: db,
        storage: FileStorage::new(host.clone(), TEST_FOLDER),
        notifier,
        auth: Arc::new(AuthSettings {
            jwt_secret: "test-secret".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
        }),
    };

    TestApp { state, host, mail }
}

pub async fn test_app() -> TestApp {
    test_app_with_host(FakeHost::default()).await
}

pub fn owner() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_OWNER.to_string(),
        permissions: Permission::ALL
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
    }
}

pub fn user_with(permissions: &[Permission]) -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_OWNER.to_string(),
        permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
    }
}
