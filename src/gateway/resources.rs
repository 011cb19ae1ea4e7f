//! Per-resource gateway wiring: endpoints, cache tags, fixture seeds, and
//! the [`Resource`] implementations binding each model to the generic
//! gateway.

use crate::models::{
    Article, ArticlePatch, MediaItem, MediaPatch, NewArticle, NewMediaItem, NewNewsItem,
    NewProduct, NewTestimonial, NewUser, NewsItem, NewsPatch, Product, ProductPatch, RecordId,
    Resource, Role, Testimonial, TestimonialPatch, User, UserPatch,
};
use chrono::{DateTime, Duration, Utc};

impl Resource for Product {
    type Draft = NewProduct;
    type Patch = ProductPatch;

    const ENDPOINT: &'static str = "/products";
    const TAG: &'static str = "products";
    // The dashboard analytics view aggregates the product catalog.
    const EXTRA_TAGS: &'static [&'static str] = &["analytics"];

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: NewProduct, id: RecordId, now: DateTime<Utc>) -> Self {
        Product {
            id,
            name: draft.name,
            price: draft.price,
            image: draft.image,
            description: draft.description,
            category: draft.category,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &ProductPatch, now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image) = &patch.image {
            self.image = image.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        self.updated_at = now;
    }
}

impl Resource for Article {
    type Draft = NewArticle;
    type Patch = ArticlePatch;

    const ENDPOINT: &'static str = "/articles";
    const TAG: &'static str = "articles";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: NewArticle, id: RecordId, now: DateTime<Utc>) -> Self {
        Article {
            id,
            title: draft.title,
            body: draft.body,
            author: draft.author,
            cover_image_url: draft.cover_image_url,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &ArticlePatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(body) = &patch.body {
            self.body = body.clone();
        }
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(cover_image_url) = &patch.cover_image_url {
            self.cover_image_url = Some(cover_image_url.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        self.updated_at = now;
    }
}

impl Resource for NewsItem {
    type Draft = NewNewsItem;
    type Patch = NewsPatch;

    const ENDPOINT: &'static str = "/news";
    const TAG: &'static str = "news";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.published_at
    }

    fn from_draft(draft: NewNewsItem, id: RecordId, now: DateTime<Utc>) -> Self {
        NewsItem {
            id,
            title: draft.title,
            content: draft.content,
            category: draft.category,
            image_url: draft.image_url,
            published_at: now,
        }
    }

    // News has no updated_at; edits keep the publication timestamp.
    fn apply_patch(&mut self, patch: &NewsPatch, _now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(image_url) = &patch.image_url {
            self.image_url = Some(image_url.clone());
        }
    }
}

impl Resource for Testimonial {
    type Draft = NewTestimonial;
    type Patch = TestimonialPatch;

    const ENDPOINT: &'static str = "/testimonials";
    const TAG: &'static str = "testimonials";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: NewTestimonial, id: RecordId, now: DateTime<Utc>) -> Self {
        Testimonial {
            id,
            author: draft.author,
            quote: draft.quote,
            created_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &TestimonialPatch, _now: DateTime<Utc>) {
        if let Some(author) = &patch.author {
            self.author = author.clone();
        }
        if let Some(quote) = &patch.quote {
            self.quote = quote.clone();
        }
    }
}

impl Resource for MediaItem {
    type Draft = NewMediaItem;
    type Patch = MediaPatch;

    const ENDPOINT: &'static str = "/media";
    const TAG: &'static str = "media";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    fn from_draft(draft: NewMediaItem, id: RecordId, now: DateTime<Utc>) -> Self {
        MediaItem {
            id,
            url: draft.url,
            name: draft.name,
            alt_text: draft.alt_text,
            uploaded_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &MediaPatch, _now: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(alt_text) = &patch.alt_text {
            self.alt_text = alt_text.clone();
        }
    }
}

impl Resource for User {
    type Draft = NewUser;
    type Patch = UserPatch;

    const ENDPOINT: &'static str = "/users";
    const TAG: &'static str = "users";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn ordering_key(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(draft: NewUser, id: RecordId, now: DateTime<Utc>) -> Self {
        User {
            id,
            display_name: draft.display_name,
            email: draft.email,
            role: draft.role,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &UserPatch, now: DateTime<Utc>) {
        self.merge_patch(patch, now);
    }
}

/// Fixture seeds for the fallback stores, mirroring the demo catalog.
pub mod fixtures {
    use super::*;

    pub fn products() -> Vec<Product> {
        let now = Utc::now();
        vec![
            Product {
                id: RecordId::from("prod-seed-1"),
                name: "Keripik Pisang Pedas".into(),
                price: 12000,
                image: "https://placehold.co/600x400.png".into(),
                description: Some("Keripik pisang dengan rasa pedas mantap.".into()),
                category: "Keripik Pisang".into(),
                created_at: now - Duration::days(2),
                updated_at: now - Duration::days(1),
            },
            Product {
                id: RecordId::from("prod-seed-2"),
                name: "Keripik Singkong Original".into(),
                price: 10000,
                image: "https://placehold.co/600x400.png".into(),
                description: Some("Rasa original singkong yang renyah.".into()),
                category: "Keripik Singkong".into(),
                created_at: now - Duration::days(5),
                updated_at: now - Duration::days(5),
            },
        ]
    }

    pub fn articles() -> Vec<Article> {
        let now = Utc::now();
        vec![Article {
            id: RecordId::from("art-seed-1"),
            title: "Di Balik Dapur Kami".into(),
            body: "Cerita singkat tentang proses produksi keripik.".into(),
            author: "Tim Redaksi".into(),
            cover_image_url: None,
            tags: vec!["produksi".into(), "profil".into()],
            created_at: now - Duration::days(7),
            updated_at: now - Duration::days(7),
        }]
    }

    pub fn news() -> Vec<NewsItem> {
        let now = Utc::now();
        vec![NewsItem {
            id: RecordId::from("news-seed-1"),
            title: "Varian Baru Segera Hadir".into(),
            content: "Varian keripik talas akan tersedia bulan depan.".into(),
            category: "Produk".into(),
            image_url: None,
            published_at: now - Duration::days(3),
        }]
    }

    pub fn testimonials() -> Vec<Testimonial> {
        let now = Utc::now();
        vec![Testimonial {
            id: RecordId::from("t1"),
            author: "Budi Santoso".into(),
            quote: "Keripiknya renyah dan tidak terlalu berminyak.".into(),
            created_at: now - Duration::days(10),
        }]
    }

    pub fn media() -> Vec<MediaItem> {
        let now = Utc::now();
        vec![MediaItem {
            id: RecordId::from("media-seed-1"),
            url: "https://placehold.co/300x200.png".into(),
            name: "banner-promo.png".into(),
            alt_text: "Banner promosi keripik".into(),
            uploaded_at: now - Duration::days(1),
        }]
    }

    pub fn users() -> Vec<User> {
        let now = Utc::now();
        vec![User {
            id: RecordId::from("user-seed-1"),
            display_name: "Admin".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
            created_at: now - Duration::days(30),
            updated_at: now - Duration::days(30),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures;
    use super::*;
    use crate::client::transport::testing::ScriptedTransport;
    use crate::client::ApiClient;
    use crate::core::config::SessionConfig;
    use crate::core::error::AdminError;
    use crate::core::event_bus::RevalidationBus;
    use crate::gateway::ResourceGateway;
    use crate::session::token::{CookieAttributes, TokenStore};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn offline_gateway<R: Resource>(seed: Vec<R>) -> (Arc<ScriptedTransport>, ResourceGateway<R>, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = SessionConfig {
            token_file: dir.path().join("token.json"),
            cookie_secure: false,
            cookie_max_age: None,
            offline_user_name: "Admin (offline)".into(),
            offline_user_email: "admin@example.com".into(),
        };
        let tokens = Arc::new(TokenStore::open(config.token_file.clone()));
        tokens
            .set("test-token".into(), CookieAttributes::from_config(&config))
            .await
            .unwrap();

        let transport = Arc::new(ScriptedTransport::new());
        let gateway = ResourceGateway::new(
            ApiClient::new(transport.clone()),
            tokens,
            Arc::new(RevalidationBus::new()),
            seed,
        );
        (transport, gateway, dir)
    }

    #[tokio::test]
    async fn testimonial_patch_keeps_author_and_created_at() {
        let seed = fixtures::testimonials();
        let original = seed[0].clone();
        let (transport, gateway, _dir) = offline_gateway(seed).await;
        transport.push_unreachable();

        let served = gateway
            .update(
                &RecordId::from("t1"),
                TestimonialPatch {
                    quote: Some("Great!".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(served.is_fallback());
        assert_eq!(served.value.quote, "Great!");
        assert_eq!(served.value.author, original.author);
        assert_eq!(served.value.created_at, original.created_at);
    }

    #[tokio::test]
    async fn deleting_missing_news_is_an_explicit_not_found() {
        let (transport, gateway, _dir) = offline_gateway(fixtures::news()).await;
        transport.push_unreachable();

        let result = gateway.delete(&RecordId::from("missing-id")).await;
        match result {
            Err(AdminError::NotFound(id)) => assert_eq!(id, "missing-id"),
            other => panic!("expected not-found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn news_edits_keep_the_publication_timestamp() {
        let seed = fixtures::news();
        let published_at = seed[0].published_at;
        let (transport, gateway, _dir) = offline_gateway(seed).await;
        transport.push_unreachable();

        let served = gateway
            .update(
                &RecordId::from("news-seed-1"),
                NewsPatch {
                    title: Some("Varian Talas Sudah Hadir".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(served.value.published_at, published_at);
        assert_eq!(served.value.title, "Varian Talas Sudah Hadir");
    }

    #[tokio::test]
    async fn product_fixtures_list_newest_first_offline() {
        let (transport, gateway, _dir) = offline_gateway(fixtures::products()).await;
        transport.push_unreachable();

        let served = gateway.list().await.unwrap();
        assert!(served.is_fallback());
        assert_eq!(served.value.len(), 2);
        // Pisang Pedas (2 days old) precedes Singkong (5 days old).
        assert_eq!(served.value[0].name, "Keripik Pisang Pedas");
        assert!(served.value[0].ordering_key() >= served.value[1].ordering_key());
    }

    #[test]
    fn endpoints_and_tags_are_wired_per_resource() {
        assert_eq!(Product::ENDPOINT, "/products");
        assert_eq!(Article::ENDPOINT, "/articles");
        assert_eq!(NewsItem::ENDPOINT, "/news");
        assert_eq!(Testimonial::ENDPOINT, "/testimonials");
        assert_eq!(MediaItem::ENDPOINT, "/media");
        assert_eq!(User::ENDPOINT, "/users");
        assert_eq!(Product::TAG, "products");
        assert_eq!(User::TAG, "users");
        assert_eq!(Product::EXTRA_TAGS, ["analytics"]);
        assert!(NewsItem::EXTRA_TAGS.is_empty());
    }
}
