//! Tag lifecycle integration tests
//! Run: cargo test -p pokemart-server --test tag_lifecycle

use pokemart_server::db::Database;
use pokemart_server::db::models::{ItemCreate, TagCreate, TagUpdate};
use pokemart_server::db::repository::{RepoError, TagRepository};
use pokemart_server::services::ItemService;

async fn setup() -> (tempfile::TempDir, TagRepository, ItemService) {
    let tmp = tempfile::tempdir().unwrap();
    let db = Database::connect(tmp.path()).await.unwrap();
    let client = db.client();
    (tmp, TagRepository::new(client.clone()), ItemService::new(client))
}

#[tokio::test]
async fn create_and_list_ordered_by_name() {
    let (_tmp, tags, _items) = setup().await;

    for name in ["healing", "battle", "held-item"] {
        tags.create(TagCreate { name: name.to_string() }).await.unwrap();
    }

    let all = tags.find_all().await.unwrap();
    let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["battle", "healing", "held-item"]);
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let (_tmp, tags, _items) = setup().await;

    tags.create(TagCreate { name: "healing".to_string() }).await.unwrap();
    let err = tags
        .create(TagCreate { name: "healing".to_string() })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)), "got {err:?}");
}

#[tokio::test]
async fn rename_updates_the_name() {
    let (_tmp, tags, _items) = setup().await;

    let created = tags
        .create(TagCreate { name: "healing".to_string() })
        .await
        .unwrap();
    let id = created.id.unwrap().to_string();

    let renamed = tags
        .update(&id, TagUpdate { name: Some("restorative".to_string()) })
        .await
        .unwrap();
    assert_eq!(renamed.name, "restorative");
    assert!(renamed.updated_at >= created.updated_at);

    // An empty update is a no-op, not an error
    let unchanged = tags.update(&id, TagUpdate::default()).await.unwrap();
    assert_eq!(unchanged.name, "restorative");
}

#[tokio::test]
async fn rename_to_a_taken_name_is_rejected() {
    let (_tmp, tags, _items) = setup().await;

    tags.create(TagCreate { name: "healing".to_string() }).await.unwrap();
    let other = tags
        .create(TagCreate { name: "battle".to_string() })
        .await
        .unwrap();

    let err = tags
        .update(
            &other.id.unwrap().to_string(),
            TagUpdate { name: Some("healing".to_string()) },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)), "got {err:?}");
}

#[tokio::test]
async fn delete_drops_references_from_items() {
    let (_tmp, tags, items) = setup().await;

    let healing = tags
        .create(TagCreate { name: "healing".to_string() })
        .await
        .unwrap();
    tags.create(TagCreate { name: "battle".to_string() }).await.unwrap();

    let view = items
        .create(ItemCreate {
            name: "Potion".to_string(),
            category: "medicine".to_string(),
            price: 300.0,
            description: "Heals 20 HP".to_string(),
            photo_url: String::new(),
            tags: vec!["healing".to_string(), "battle".to_string()],
            discount: None,
            is_new_item: false,
        })
        .await
        .unwrap();
    assert_eq!(view.tags.len(), 2);

    tags.delete(&healing.id.unwrap().to_string()).await.unwrap();

    let after = items.get(&view.id).await.unwrap();
    assert_eq!(after.tags, vec!["battle".to_string()]);
}

#[tokio::test]
async fn missing_tags_are_not_found() {
    let (_tmp, tags, _items) = setup().await;

    let err = tags
        .update("tag:missing", TagUpdate { name: Some("x".to_string()) })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)), "got {err:?}");

    let err = tags.delete("tag:missing").await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)), "got {err:?}");
}
