//! Generic resource gateway
//!
//! One gateway per resource type. Every operation tries the live backend
//! first; transport failures degrade to the in-memory fallback store under
//! the rules below, and the result carries an explicit marker for which
//! path served it.
//!
//! Fallback rules:
//! - `list` falls back on any failure; a fallback list is a degraded
//!   result, not an error.
//! - `create` requires a token, then synthesizes the record locally on
//!   transport failure.
//! - `update` falls back only onto a record the store already knows;
//!   patching a record it has never seen is a hard not-found.
//! - `delete` removes from the store on transport failure, or reports
//!   not-found.
//! - Domain failures (`success: false`) and 401/403 rejections always
//!   surface as errors; they are never masked by fallback.

pub mod resources;

use crate::client::ApiClient;
use crate::core::error::{AdminError, Result};
use crate::core::event_bus::{EventSource, RevalidationBus};
use crate::models::{RecordId, Resource};
use crate::session::token::TokenStore;
use crate::store::MockFallbackStore;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Which path produced a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    Fallback,
}

/// A successful operation result, marked with the path that served it.
///
/// Callers must not treat `Fallback` as an error; it only signals the
/// degraded path so UIs and tests can tell the two apart.
#[derive(Debug, Clone)]
pub struct Served<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Served<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: DataSource::Live,
        }
    }

    pub fn fallback(value: T) -> Self {
        Self {
            value,
            source: DataSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }
}

/// Gateway for one resource type: list, create, update, delete.
pub struct ResourceGateway<R: Resource> {
    client: ApiClient,
    tokens: Arc<TokenStore>,
    bus: Arc<RevalidationBus>,
    store: Mutex<MockFallbackStore<R>>,
}

impl<R: Resource> ResourceGateway<R> {
    pub fn new(
        client: ApiClient,
        tokens: Arc<TokenStore>,
        bus: Arc<RevalidationBus>,
        seed: Vec<R>,
    ) -> Self {
        Self {
            client,
            tokens,
            bus,
            store: Mutex::new(MockFallbackStore::seeded(seed)),
        }
    }

    fn item_path(id: &RecordId) -> String {
        format!("{}/{}", R::ENDPOINT, id)
    }

    async fn revalidate(&self) {
        self.bus.publish(R::TAG, EventSource::System).await;
        for tag in R::EXTRA_TAGS {
            self.bus.publish(tag, EventSource::System).await;
        }
    }

    /// Fetch the collection, newest first.
    ///
    /// Any failure is answered from the fallback store; the degraded path
    /// is reported via the result's `source`.
    pub async fn list(&self) -> Result<Served<Vec<R>>> {
        let bearer = self.tokens.get().await;
        match self.client.get_json::<Vec<R>>(R::ENDPOINT, bearer).await {
            Ok(records) => {
                tracing::debug!(resource = R::TAG, count = records.len(), "Listed from backend");
                Ok(Served::live(records))
            }
            Err(e) => {
                let store = self.store.lock().await;
                tracing::warn!(
                    resource = R::TAG,
                    error = %e,
                    count = store.len(),
                    "Backend list failed, serving fallback snapshot"
                );
                Ok(Served::fallback(store.snapshot()))
            }
        }
    }

    /// Create a record. Requires a token: creation carries identity, so an
    /// unauthenticated call is an error rather than a fallback.
    pub async fn create(&self, draft: R::Draft) -> Result<Served<R>> {
        let token = self.tokens.get().await.ok_or(AdminError::Unauthenticated)?;
        let body = serde_json::to_value(&draft)?;

        match self
            .client
            .post_json::<R>(R::ENDPOINT, Some(token), body)
            .await
        {
            Ok(record) => {
                tracing::info!(resource = R::TAG, id = %record.id(), "Created on backend");
                self.revalidate().await;
                Ok(Served::live(record))
            }
            Err(e) if e.is_transport() => {
                let record = R::from_draft(draft, RecordId::generate(), Utc::now());
                {
                    let mut store = self.store.lock().await;
                    store.insert_front(record.clone());
                }
                tracing::warn!(
                    resource = R::TAG,
                    id = %record.id(),
                    error = %e,
                    "Backend create failed, synthesized record in fallback store"
                );
                self.revalidate().await;
                Ok(Served::fallback(record))
            }
            Err(e) => Err(e),
        }
    }

    /// Update a record. On transport failure the patch is applied to the
    /// fallback copy when one exists; an unknown id is a hard not-found,
    /// since editing a nonexistent record is a logic bug rather than a
    /// connectivity issue.
    pub async fn update(&self, id: &RecordId, patch: R::Patch) -> Result<Served<R>> {
        let token = self.tokens.get().await.ok_or(AdminError::Unauthenticated)?;
        let body = serde_json::to_value(&patch)?;

        match self
            .client
            .put_json::<R>(&Self::item_path(id), Some(token), body)
            .await
        {
            Ok(record) => {
                // Keep the fallback copy coherent when one exists.
                {
                    let mut store = self.store.lock().await;
                    store.replace(id, record.clone());
                }
                tracing::info!(resource = R::TAG, id = %id, "Updated on backend");
                self.revalidate().await;
                Ok(Served::live(record))
            }
            Err(e) if e.is_transport() => {
                let mut store = self.store.lock().await;
                let Some(existing) = store.find_by_id(id).cloned() else {
                    tracing::warn!(
                        resource = R::TAG,
                        id = %id,
                        "Backend update failed and record unknown to fallback store"
                    );
                    return Err(AdminError::NotFound(id.to_string()));
                };

                let mut updated = existing;
                updated.apply_patch(&patch, Utc::now());
                store.replace(id, updated.clone());
                drop(store);

                tracing::warn!(
                    resource = R::TAG,
                    id = %id,
                    error = %e,
                    "Backend update failed, patched fallback copy"
                );
                self.revalidate().await;
                Ok(Served::fallback(updated))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a record. 200/204/empty bodies count as success; on
    /// transport failure the record is removed from the fallback store if
    /// present, else not-found.
    pub async fn delete(&self, id: &RecordId) -> Result<Served<()>> {
        let token = self.tokens.get().await.ok_or(AdminError::Unauthenticated)?;

        match self.client.delete(&Self::item_path(id), Some(token)).await {
            Ok(()) => {
                {
                    let mut store = self.store.lock().await;
                    store.remove_by_id(id);
                }
                tracing::info!(resource = R::TAG, id = %id, "Deleted on backend");
                self.revalidate().await;
                Ok(Served::live(()))
            }
            Err(e) if e.is_transport() => {
                let removed = {
                    let mut store = self.store.lock().await;
                    store.remove_by_id(id)
                };
                if removed {
                    tracing::warn!(
                        resource = R::TAG,
                        id = %id,
                        error = %e,
                        "Backend delete failed, removed from fallback store"
                    );
                    self.revalidate().await;
                    Ok(Served::fallback(()))
                } else {
                    Err(AdminError::NotFound(id.to_string()))
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Number of records currently held by the fallback store.
    pub async fn fallback_len(&self) -> usize {
        self.store.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::ScriptedTransport;
    use crate::core::config::SessionConfig;
    use crate::models::{NewProduct, Product, ProductPatch};
    use crate::session::token::{CookieAttributes, TokenStore};
    use serde_json::json;
    use tempfile::TempDir;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        gateway: ResourceGateway<Product>,
        bus: Arc<RevalidationBus>,
        _dir: TempDir,
    }

    fn session_config(dir: &TempDir) -> SessionConfig {
        SessionConfig {
            token_file: dir.path().join("token.json"),
            cookie_secure: false,
            cookie_max_age: None,
            offline_user_name: "Admin (offline)".into(),
            offline_user_email: "admin@example.com".into(),
        }
    }

    async fn harness(seed: Vec<Product>, with_token: bool) -> Harness {
        let dir = TempDir::new().unwrap();
        let config = session_config(&dir);
        let tokens = Arc::new(TokenStore::open(config.token_file.clone()));
        if with_token {
            tokens
                .set("test-token".into(), CookieAttributes::from_config(&config))
                .await
                .unwrap();
        }
        let transport = Arc::new(ScriptedTransport::new());
        let bus = Arc::new(RevalidationBus::new());
        let gateway = ResourceGateway::new(
            ApiClient::new(transport.clone()),
            tokens,
            bus.clone(),
            seed,
        );
        Harness {
            transport,
            gateway,
            bus,
            _dir: dir,
        }
    }

    fn product_json(id: &str, name: &str, created_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "price": 10000,
            "image": "https://placehold.co/600x400.png",
            "category": "Keripik",
            "createdAt": created_at,
            "updatedAt": created_at
        })
    }

    fn seed_product(id: &str, name: &str) -> Product {
        serde_json::from_value(product_json(id, name, "2024-02-01T00:00:00Z")).unwrap()
    }

    #[tokio::test]
    async fn list_serves_live_records_when_backend_answers() {
        let h = harness(vec![], true).await;
        h.transport.push_json(
            200,
            json!({"success": true, "data": [product_json("p1", "Keripik Singkong", "2024-02-01T00:00:00Z")]}),
        );

        let served = h.gateway.list().await.unwrap();
        assert_eq!(served.source, DataSource::Live);
        assert_eq!(served.value.len(), 1);
        assert_eq!(served.value[0].name, "Keripik Singkong");
    }

    #[tokio::test]
    async fn list_falls_back_when_backend_is_unreachable() {
        let h = harness(vec![seed_product("p1", "Keripik Pisang Pedas")], true).await;
        h.transport.push_unreachable();

        let served = h.gateway.list().await.unwrap();
        assert!(served.is_fallback());
        assert_eq!(served.value[0].name, "Keripik Pisang Pedas");
    }

    #[tokio::test]
    async fn list_falls_back_on_non_json_body() {
        let h = harness(vec![seed_product("p1", "Keripik")], true).await;
        h.transport.push_raw(200, "<html>bad gateway</html>");

        let served = h.gateway.list().await.unwrap();
        assert!(served.is_fallback());
        assert_eq!(served.value.len(), 1);
    }

    #[tokio::test]
    async fn create_without_token_is_unauthenticated_no_fallback() {
        let h = harness(vec![], false).await;
        let result = h
            .gateway
            .create(NewProduct {
                name: "Keripik Pisang".into(),
                price: 15000,
                image: "https://placehold.co/600x400.png".into(),
                description: None,
                category: "Keripik".into(),
            })
            .await;

        assert!(matches!(result, Err(AdminError::Unauthenticated)));
        assert_eq!(h.gateway.fallback_len().await, 0);
    }

    #[tokio::test]
    async fn create_offline_synthesizes_record_and_lists_it_first() {
        let h = harness(vec![seed_product("p0", "Older product")], true).await;
        h.transport.push_unreachable(); // create
        h.transport.push_unreachable(); // list

        let created = h
            .gateway
            .create(NewProduct {
                name: "Keripik Pisang".into(),
                price: 15000,
                image: "https://placehold.co/600x400.png".into(),
                description: None,
                category: "Keripik".into(),
            })
            .await
            .unwrap();

        assert!(created.is_fallback());
        assert!(!created.value.id().to_string().is_empty());

        let listed = h.gateway.list().await.unwrap();
        assert!(listed.is_fallback());
        assert_eq!(listed.value[0].name, "Keripik Pisang");
        assert_eq!(listed.value[0].price, 15000);
        // Exactly once.
        let hits = listed
            .value
            .iter()
            .filter(|p| p.id() == created.value.id())
            .count();
        assert_eq!(hits, 1);
    }

    #[tokio::test]
    async fn create_surfaces_domain_failure_instead_of_falling_back() {
        let h = harness(vec![], true).await;
        h.transport.push_json(
            200,
            json!({"success": false, "message": "Name already taken"}),
        );

        let result = h
            .gateway
            .create(NewProduct {
                name: "Dup".into(),
                price: 1,
                image: "x".into(),
                description: None,
                category: "Keripik".into(),
            })
            .await;

        match result {
            Err(AdminError::Domain(msg)) => assert_eq!(msg, "Name already taken"),
            other => panic!("expected domain error, got {:?}", other),
        }
        assert_eq!(h.gateway.fallback_len().await, 0);
    }

    #[tokio::test]
    async fn update_patches_fallback_copy_and_bumps_updated_at() {
        let h = harness(vec![seed_product("p1", "Keripik Pisang")], true).await;
        h.transport.push_unreachable();

        let before = seed_product("p1", "Keripik Pisang").updated_at;
        let served = h
            .gateway
            .update(
                &RecordId::from("p1"),
                ProductPatch {
                    price: Some(18000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(served.is_fallback());
        assert_eq!(served.value.price, 18000);
        // Untouched fields survive.
        assert_eq!(served.value.name, "Keripik Pisang");
        assert_eq!(served.value.category, "Keripik");
        assert!(served.value.updated_at >= before);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_a_hard_not_found() {
        let h = harness(vec![], true).await;
        h.transport.push_unreachable();

        let result = h
            .gateway
            .update(&RecordId::from("missing"), ProductPatch::default())
            .await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_propagates_auth_rejection() {
        let h = harness(vec![seed_product("p1", "Keripik")], true).await;
        h.transport.push_json(401, json!({"success": false}));

        let result = h
            .gateway
            .update(&RecordId::from("p1"), ProductPatch::default())
            .await;
        assert!(matches!(result, Err(AdminError::Unauthorized(401))));
    }

    #[tokio::test]
    async fn delete_offline_removes_record_then_reports_not_found() {
        let h = harness(vec![seed_product("p1", "Keripik")], true).await;
        h.transport.push_unreachable(); // first delete
        h.transport.push_unreachable(); // second delete
        h.transport.push_unreachable(); // list

        let first = h.gateway.delete(&RecordId::from("p1")).await.unwrap();
        assert!(first.is_fallback());

        let second = h.gateway.delete(&RecordId::from("p1")).await;
        assert!(matches!(second, Err(AdminError::NotFound(_))));

        let listed = h.gateway.list().await.unwrap();
        assert!(listed.value.iter().all(|p| p.id() != &RecordId::from("p1")));
    }

    #[tokio::test]
    async fn delete_tolerates_empty_204() {
        let h = harness(vec![seed_product("p1", "Keripik")], true).await;
        h.transport.push_raw(204, "");

        let served = h.gateway.delete(&RecordId::from("p1")).await.unwrap();
        assert_eq!(served.source, DataSource::Live);
        // Live delete also drops the fallback copy.
        assert_eq!(h.gateway.fallback_len().await, 0);
    }

    #[tokio::test]
    async fn successful_writes_publish_resource_and_derived_tags() {
        let h = harness(vec![], true).await;
        h.transport.push_json(
            201,
            json!({"success": true, "data": product_json("p9", "Keripik Baru", "2024-03-01T00:00:00Z")}),
        );

        h.gateway
            .create(NewProduct {
                name: "Keripik Baru".into(),
                price: 9000,
                image: "x".into(),
                description: None,
                category: "Keripik".into(),
            })
            .await
            .unwrap();

        let history = h.bus.history().await;
        let tags: Vec<&str> = history.iter().map(|e| e.tag.as_str()).collect();
        // Product writes also refresh the analytics view.
        assert_eq!(tags, vec!["products", "analytics"]);
    }

    #[tokio::test]
    async fn requests_carry_bearer_auth_and_endpoint_paths() {
        let h = harness(vec![], true).await;
        h.transport.push_json(200, json!({"success": true, "data": []}));
        h.gateway.list().await.unwrap();

        let seen = h.transport.seen();
        assert_eq!(seen[0].path, "/products");
        assert_eq!(seen[0].bearer.as_deref(), Some("test-token"));
    }
}
