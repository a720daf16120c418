use std::sync::Arc;

use rust_kv_store::{
    CounterOps, KvStore, ShopItem, ShopOps, SqliteStore, StoreConfig, StoreError, User, UserOps,
    SHOP_ITEMS_KEY,
};
use serde_json::{json, Number};
use tempfile::TempDir;

fn create_temp_store(name: &str) -> anyhow::Result<(SqliteStore, TempDir)> {
    let dir = TempDir::new()?;
    let store = SqliteStore::open(StoreConfig::file(dir.path().join(format!("{name}.sqlite"))))?;
    Ok((store, dir))
}

#[tokio::test]
async fn test_set_and_delete_user() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("t1")?;
    store.set_user("u1", "a@b.c", "Alice").await?;

    assert_eq!(
        store.get_object("u1").await?,
        Some(json!({ "e_mail": "a@b.c", "name": "Alice" }))
    );
    assert_eq!(store.get_user("u1").await?, Some(User::new("a@b.c", "Alice")));

    store.delete_user("u1").await?;
    assert_eq!(store.get_object("u1").await?, None);
    assert_eq!(store.get_user("u1").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_set_user_overwrites_wholesale() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("overwrite")?;
    store
        .set_object("u1", json!({ "e_mail": "x", "name": "y", "extra": 1 }))
        .await?;
    store.set_user("u1", "a@b.c", "Alice").await?;

    assert_eq!(
        store.get_object("u1").await?,
        Some(json!({ "e_mail": "a@b.c", "name": "Alice" }))
    );
    Ok(())
}

#[tokio::test]
async fn test_change_user_mail_keeps_name() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("t2")?;
    store.set_user("u2", "old@x.y", "Bob").await?;

    let updated = store.change_user_mail("u2", "new@x.y").await?;
    assert_eq!(updated, Some(User::new("new@x.y", "Bob")));
    assert_eq!(
        store.get_object("u2").await?,
        Some(json!({ "e_mail": "new@x.y", "name": "Bob" }))
    );
    Ok(())
}

#[tokio::test]
async fn test_change_user_mail_on_missing_user() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("missing-user")?;
    assert_eq!(store.change_user_mail("ghost", "a@b.c").await?, None);
    assert_eq!(store.get_object("ghost").await?, None);
    Ok(())
}

#[tokio::test]
async fn test_change_user_mail_on_non_user_value() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("bad-user")?;
    store.set_object("u3", json!([1, 2])).await?;

    let err = store.change_user_mail("u3", "a@b.c").await.unwrap_err();
    assert!(matches!(err, StoreError::Shape { ref id, .. } if id == "u3"));
    assert_eq!(store.get_object("u3").await?, Some(json!([1, 2])));
    Ok(())
}

#[tokio::test]
async fn test_counter_set_add_remove() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("nums")?;
    store.set_user_value("u", ":coins", 0).await?;
    store.add_user_value("u", ":coins", 10).await?;
    let total = store.remove_user_value("u", ":coins", 3).await?;

    assert_eq!(total, Number::from(7));
    assert_eq!(store.get_object("u:coins").await?, Some(json!(7)));
    assert_eq!(store.get_user_value("u", "coins").await?, Some(Number::from(7)));
    Ok(())
}

#[tokio::test]
async fn test_counter_missing_is_zero_and_can_go_negative() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("negative")?;
    assert_eq!(store.get_user_value("u", "gems").await?, None);

    let total = store.remove_user_value("u", "gems", 4).await?;
    assert_eq!(total, Number::from(-4));
    assert_eq!(store.get_object("u:gems").await?, Some(json!(-4)));
    Ok(())
}

#[tokio::test]
async fn test_counter_rejects_non_numeric_value() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("nan")?;
    store.set_object("u:coins", json!("ten")).await?;

    let err = store.add_user_value("u", ":coins", 1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotANumber { ref id } if id == "u:coins"));
    assert_eq!(store.get_object("u:coins").await?, Some(json!("ten")));
    assert!(matches!(
        store.get_user_value("u", ":coins").await,
        Err(StoreError::NotANumber { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_counter_float_arithmetic() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("floats")?;
    let tenth = Number::from_f64(0.1).unwrap();
    let fifth = Number::from_f64(0.2).unwrap();
    store.set_user_value("u", "ratio", tenth).await?;

    let total = store.add_user_value("u", "ratio", fifth).await?;
    assert_eq!(total.as_f64(), Some(0.1 + 0.2));
    assert_eq!(store.get_object("u:ratio").await?, Some(json!(0.1 + 0.2)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_lose_no_updates() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("concurrent")?;
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.add_user_value("u", "hits", 1).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(store.get_object("u:hits").await?, Some(json!(50)));
    Ok(())
}

#[tokio::test]
async fn test_shop_set_add_remove() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop")?;
    store.set_shop(Vec::new()).await?;

    let items = store.add_shop_item("server", json!({ "id": 1 })).await?;
    assert_eq!(items, Some(vec![ShopItem::new("server", json!({ "id": 1 }))]));
    assert_eq!(
        store.get_object(SHOP_ITEMS_KEY).await?,
        Some(json!([{ "type": "server", "data": { "id": 1 } }]))
    );

    let items = store.remove_shop_item(0).await?;
    assert_eq!(items, Some(Vec::new()));
    assert_eq!(store.get_object(SHOP_ITEMS_KEY).await?, Some(json!([])));
    Ok(())
}

#[tokio::test]
async fn test_add_shop_item_rejects_empty_type() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop-empty")?;
    store
        .set_shop(vec![ShopItem::new("server", json!({ "id": 1 }))])
        .await?;
    let before = store.get_object(SHOP_ITEMS_KEY).await?;

    assert_eq!(store.add_shop_item("", json!({ "id": 2 })).await?, None);
    assert_eq!(store.get_object(SHOP_ITEMS_KEY).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_add_shop_item_creates_collection() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop-create")?;
    store.add_shop_item("server", json!({ "id": 1 })).await?;
    store.add_shop_item("skin", json!({ "id": 2 })).await?;

    let shop = store.get_shop().await?.unwrap_or_default();
    let types: Vec<&str> = shop.iter().map(|i| i.item_type.as_str()).collect();
    assert_eq!(types, ["server", "skin"]);
    Ok(())
}

#[tokio::test]
async fn test_remove_shop_item_when_shop_missing() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop-miss")?;
    assert_eq!(store.remove_shop_item(0).await?, None);
    assert_eq!(store.get_object(SHOP_ITEMS_KEY).await?, None);
    Ok(())
}

#[tokio::test]
async fn test_remove_shop_item_shifts_entries() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop-shift")?;
    store
        .set_shop(vec![
            ShopItem::new("a", json!({})),
            ShopItem::new("b", json!({})),
            ShopItem::new("c", json!({})),
        ])
        .await?;

    store.remove_shop_item(1).await?;
    assert_eq!(
        store.get_object(SHOP_ITEMS_KEY).await?,
        Some(json!([{ "type": "a", "data": {} }, { "type": "c", "data": {} }]))
    );
    Ok(())
}

#[tokio::test]
async fn test_remove_shop_item_out_of_range_is_noop() -> anyhow::Result<()> {
    let (store, _dir) = create_temp_store("shop-range")?;
    let items = vec![ShopItem::new("server", json!({ "id": 1 }))];
    store.set_shop(items.clone()).await?;

    assert_eq!(store.remove_shop_item(5).await?, Some(items.clone()));
    assert_eq!(store.get_shop().await?, Some(items));
    Ok(())
}
