//! Typed service wrappers against the mock backend: query encoding,
//! resource-wrapped bodies, and attachment references.

use rust_decimal::Decimal;

use green_mango_client::services::ListQuery;
use green_mango_client::services::banners::BannerPosition;
use green_mango_client::services::products::ProductCreate;
use green_mango_client::services::users::UserCreate;
use green_mango_core::{BannerId, CategoryId, EntityStatus, Price, UserRole};
use green_mango_integration_tests::TestContext;

#[tokio::test]
async fn test_product_list_encodes_filters() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let query = ListQuery {
        q: Some("mango".to_string()),
        status: Some(EntityStatus::Active),
        page: Some(2),
        per_page: Some(50),
        ..ListQuery::default()
    };
    let page = ctx.client.products().list(&query).await.expect("list");

    let sent = ctx
        .state
        .products_query
        .lock()
        .expect("captured query")
        .clone()
        .expect("query string present");
    assert_eq!(sent, "q=mango&status=active&page=2&per_page=50");

    assert_eq!(page.data.len(), 1);
    let product = &page.data[0];
    assert_eq!(product.id.as_i32(), 42);
    assert_eq!(product.price.to_string(), "12.50");
    assert_eq!(product.images.len(), 1);
    assert!(!page.has_next_page());
}

#[tokio::test]
async fn test_product_create_wraps_resource_and_carries_blob_references() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let references = ctx
        .client
        .uploads()
        .upload_all(&[
            green_mango_client::LocalFile::new("a.jpg", "image/jpeg", vec![1u8; 8]),
            green_mango_client::LocalFile::new("b.png", "image/png", vec![2u8; 8]),
        ])
        .await
        .expect("uploads");

    let params = ProductCreate {
        name: "Green mango crate".to_string(),
        description: Some("A crate of green mangoes".to_string()),
        price: Price::new(Decimal::new(1250, 2)),
        stock_quantity: 7,
        status: EntityStatus::Active,
        category_id: Some(CategoryId::new(3)),
        new_image_signed_ids: references,
    };
    let product = ctx.client.products().create(&params).await.expect("create");
    assert_eq!(product.id.as_i32(), 100);

    let sent = ctx
        .state
        .product_create
        .lock()
        .expect("captured body")
        .clone()
        .expect("create body present");
    assert_eq!(sent["name"], "Green mango crate");
    assert_eq!(sent["price"], "12.50");
    assert_eq!(
        sent["new_image_signed_ids"],
        serde_json::json!(["signed-0", "signed-1"])
    );
}

#[tokio::test]
async fn test_user_create_carries_avatar_blob_reference() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let avatar = ctx
        .client
        .uploads()
        .upload(&green_mango_client::LocalFile::new(
            "avatar.png",
            "image/png",
            vec![3u8; 16],
        ))
        .await
        .expect("avatar upload");

    let params = UserCreate {
        email: "new@example.com".to_string(),
        password: "hunter22".to_string(),
        password_confirmation: "hunter22".to_string(),
        full_name: "New Admin".to_string(),
        role: UserRole::Admin,
        phone: None,
        avatar: Some(avatar),
    };
    let user = ctx.client.users().create(&params).await.expect("create");
    assert_eq!(user.id.as_i32(), 7);
    assert_eq!(
        user.avatar_url.as_deref(),
        Some("https://cdn.example/avatars/signed-0.jpg")
    );

    let sent = ctx
        .state
        .user_create
        .lock()
        .expect("captured body")
        .clone()
        .expect("create body present");
    assert_eq!(sent["email"], "new@example.com");
    assert_eq!(sent["password_confirmation"], "hunter22");
    assert_eq!(sent["avatar"], "signed-0");
    assert!(sent.get("phone").is_none());
}

#[tokio::test]
async fn test_banner_reorder_sends_positions_in_one_call() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let positions = vec![
        BannerPosition {
            id: BannerId::new(3),
            display_order: 1,
        },
        BannerPosition {
            id: BannerId::new(1),
            display_order: 2,
        },
    ];
    ctx.client
        .banners()
        .reorder(&positions)
        .await
        .expect("reorder");

    let sent = ctx
        .state
        .reorder_body
        .lock()
        .expect("captured body")
        .clone()
        .expect("reorder body present");
    assert_eq!(
        sent,
        serde_json::json!({
            "banners": [
                {"id": 3, "display_order": 1},
                {"id": 1, "display_order": 2},
            ],
        })
    );
}
