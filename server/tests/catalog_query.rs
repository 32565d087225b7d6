//! Item query engine integration tests
//! Run: cargo test -p pokemart-server --test catalog_query

use pokemart_server::catalog::{ItemQuery, SortKey, SortOrder};
use pokemart_server::common::AppError;
use pokemart_server::db::Database;
use pokemart_server::db::models::{Discount, DiscountType, ItemCreate, TagCreate};
use pokemart_server::db::repository::TagRepository;
use pokemart_server::services::ItemService;

async fn setup() -> (tempfile::TempDir, ItemService) {
    let tmp = tempfile::tempdir().unwrap();
    let db = Database::connect(tmp.path()).await.unwrap();
    let client = db.client();

    let tags = TagRepository::new(client.clone());
    for name in ["healing", "battle", "held-item"] {
        tags.create(TagCreate { name: name.to_string() }).await.unwrap();
    }

    (tmp, ItemService::new(client))
}

fn item(
    name: &str,
    category: &str,
    price: f64,
    description: &str,
    tags: &[&str],
    discount: Option<Discount>,
) -> ItemCreate {
    ItemCreate {
        name: name.to_string(),
        category: category.to_string(),
        price,
        description: description.to_string(),
        photo_url: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        discount,
        is_new_item: false,
    }
}

fn pct(amount: f64) -> Option<Discount> {
    Some(Discount {
        amount,
        kind: DiscountType::Percentage,
    })
}

fn abs(amount: f64) -> Option<Discount> {
    Some(Discount {
        amount,
        kind: DiscountType::Absolute,
    })
}

/// Nine items across five categories; discounted prices in parentheses:
/// Potion 300, Super Potion 700 (140), Hyper Potion 1200 (1000),
/// Oran Berry 80, Sitrus Berry 200, Poké Ball 200, Ultra Ball 1200 (600),
/// Protein 9800, TM01 Mega Punch 3000
async fn seed(items: &ItemService) {
    let fixtures = [
        item("Potion", "medicine", 300.0, "Heals 20 HP", &["healing"], None),
        item("Super Potion", "medicine", 700.0, "Heals 60 HP", &["healing"], pct(80.0)),
        item("Hyper Potion", "medicine", 1200.0, "Heals 120 HP", &["healing"], abs(200.0)),
        item("Oran Berry", "berries", 80.0, "Restores a little HP", &["healing"], None),
        item("Sitrus Berry", "berries", 200.0, "Restores HP when held", &["held-item"], None),
        item("Poké Ball", "pokéballs", 200.0, "Catches wild Pokémon", &["battle"], None),
        item("Ultra Ball", "pokéballs", 1200.0, "A high-performance ball", &["battle"], pct(50.0)),
        item("Protein", "vitamins", 9800.0, "Raises Attack", &[], None),
        item("TM01 Mega Punch", "tm/hm", 3000.0, "Teaches Mega Punch", &["battle"], None),
    ];
    for fixture in fixtures {
        items.create(fixture).await.unwrap();
    }
}

fn link(page: u32) -> String {
    format!("/items?page={page}")
}

fn names(page: &pokemart_server::catalog::ItemPage) -> Vec<&str> {
    page.items.iter().map(|i| i.name.as_str()).collect()
}

// =============================================================================
// Envelope
// =============================================================================

#[tokio::test]
async fn unfiltered_query_returns_full_envelope() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let page = items.list(&ItemQuery::default(), link).await.unwrap();

    assert_eq!(page.info.count, 9);
    assert_eq!(page.info.pages, 1);
    assert_eq!(page.info.page, 1);
    assert_eq!(page.items.len(), 9);
    // First page: no prev/first; last page: no next/last
    assert_eq!(page.info.prev, None);
    assert_eq!(page.info.first, None);
    assert_eq!(page.info.next, None);
    assert_eq!(page.info.last, None);

    // Every fixed category is present, zero-filled where empty
    assert_eq!(page.info.category_count.len(), 8);
    assert_eq!(page.info.category_count["medicine"], 3);
    assert_eq!(page.info.category_count["berries"], 2);
    assert_eq!(page.info.category_count["pokéballs"], 2);
    assert_eq!(page.info.category_count["vitamins"], 1);
    assert_eq!(page.info.category_count["tm/hm"], 1);
    assert_eq!(page.info.category_count["evolution"], 0);
    assert_eq!(page.info.category_count["food"], 0);
    assert_eq!(page.info.category_count["mega stones"], 0);

    // Min/max of the discounted prices across the set
    assert_eq!(page.info.price_range.min, 80.0);
    assert_eq!(page.info.price_range.max, 9800.0);
}

#[tokio::test]
async fn envelope_serializes_with_the_wire_field_names() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let page = items.list(&ItemQuery::default(), link).await.unwrap();
    let value = serde_json::to_value(&page).unwrap();

    let info = &value["info"];
    assert!(info.get("categorieCount").is_some());
    assert!(info.get("priceRange").is_some());

    let first = &value["items"][0];
    assert!(first.get("photoUrl").is_some());
    assert!(first.get("isNewItem").is_some());
    assert!(first["tags"].is_array());
    assert!(first["discount"].get("discountedPrice").is_some());
    assert!(first["discount"].get("hasDiscount").is_some());
}

#[tokio::test]
async fn items_carry_tag_names_and_computed_discounts() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        search: Some("Ultra Ball".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    assert_eq!(page.items.len(), 1);
    let ultra = &page.items[0];
    assert_eq!(ultra.tags, vec!["battle".to_string()]);
    assert_eq!(ultra.discount.amount, 50.0);
    assert_eq!(ultra.discount.discounted_price, 600.0);
    assert!(ultra.discount.has_discount);

    // Undiscounted items still carry the discount object
    let query = ItemQuery {
        search: Some("Protein".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    let protein = &page.items[0];
    assert_eq!(protein.discount.amount, 0.0);
    assert_eq!(protein.discount.discounted_price, 9800.0);
    assert!(!protein.discount.has_discount);
}

// =============================================================================
// Filters
// =============================================================================

#[tokio::test]
async fn category_tokens_are_disjunctive_and_case_insensitive() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        cat: Some("medicine,berries".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    assert_eq!(page.info.count, 5);
    for entry in &page.items {
        let label = entry.category.as_str();
        assert!(label == "medicine" || label == "berries", "got {label}");
    }

    // Category counts ignore the category filter itself
    assert_eq!(page.info.category_count["pokéballs"], 2);

    // Substring, any case
    let query = ItemQuery {
        cat: Some("MEDI".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 3);
}

#[tokio::test]
async fn search_tokens_are_conjunctive_across_fields() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    // "heal" alone matches the three potions by description plus
    // Oran Berry through its "healing" tag
    let query = ItemQuery {
        search: Some("heal".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 4);

    // Adding "potion" must narrow, not widen: both tokens required
    let query = ItemQuery {
        search: Some("heal potion".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 3);
    for entry in &page.items {
        assert!(entry.name.contains("Potion"), "got {}", entry.name);
    }
}

#[tokio::test]
async fn tag_tokens_are_disjunctive_substrings() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        tag: Some("batt".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 3);

    let query = ItemQuery {
        tag: Some("healing,held".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 5);

    // A token matching no tag matches no items
    let query = ItemQuery {
        tag: Some("legendary".to_string()),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.info.count, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn price_bounds_are_inclusive_on_the_base_price() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        min_price: Some(200.0),
        max_price: Some(1200.0),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    // 200 and 1200 are included; the Ultra Ball's 50% discount is
    // irrelevant to the base-price bounds
    assert_eq!(page.info.count, 6);
    for entry in &page.items {
        assert!(entry.price >= 200.0 && entry.price <= 1200.0);
    }
}

// =============================================================================
// Sorting
// =============================================================================

#[tokio::test]
async fn name_sort_is_store_native() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        cat: Some("medicine".to_string()),
        sort: Some(SortKey::Name),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(names(&page), vec!["Hyper Potion", "Potion", "Super Potion"]);

    let query = ItemQuery {
        order: Some(SortOrder::Desc),
        ..query
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(names(&page), vec!["Super Potion", "Potion", "Hyper Potion"]);
}

#[tokio::test]
async fn price_sort_orders_by_discounted_price() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    // Base prices order Potion(300) < Super(700) < Hyper(1200), but the
    // discounts reorder them: Super 140, Potion 300, Hyper 1000
    let query = ItemQuery {
        cat: Some("medicine".to_string()),
        sort: Some(SortKey::Price),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(names(&page), vec!["Super Potion", "Potion", "Hyper Potion"]);

    let discounted: Vec<f64> = page
        .items
        .iter()
        .map(|i| i.discount.discounted_price)
        .collect();
    assert_eq!(discounted, vec![140.0, 300.0, 1000.0]);

    let query = ItemQuery {
        order: Some(SortOrder::Desc),
        ..query
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(names(&page), vec!["Hyper Potion", "Potion", "Super Potion"]);
}

// =============================================================================
// Discounted-price bounds (aggregation strategy)
// =============================================================================

#[tokio::test]
async fn discount_bounds_filter_on_the_computed_price() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    // Discounted prices: 300, 140, 1000, 80, 200, 200, 600, 9800, 3000
    let query = ItemQuery {
        min_discounted_price: Some(100.0),
        max_discounted_price: Some(650.0),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    assert_eq!(page.info.count, 5);
    for entry in &page.items {
        let price = entry.discount.discounted_price;
        assert!((100.0..=650.0).contains(&price), "got {price}");
    }

    // The bounds are inclusive
    let query = ItemQuery {
        min_discounted_price: Some(140.0),
        max_discounted_price: Some(140.0),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(names(&page), vec!["Super Potion"]);
}

#[tokio::test]
async fn aggregation_path_sorts_and_attaches_tags() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        min_discounted_price: Some(100.0),
        max_discounted_price: Some(650.0),
        sort: Some(SortKey::Price),
        order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    // Non-increasing discounted prices; Sitrus Berry and Poké Ball tie at
    // 200, so only the endpoints are pinned
    let discounted: Vec<f64> = page
        .items
        .iter()
        .map(|i| i.discount.discounted_price)
        .collect();
    assert_eq!(discounted.len(), 5);
    assert!(discounted.windows(2).all(|w| w[0] >= w[1]), "got {discounted:?}");
    assert_eq!(page.items[0].name, "Ultra Ball");
    assert_eq!(page.items[4].name, "Super Potion");

    // Tags survive the aggregation path's second-lookup merge
    assert_eq!(page.items[0].tags, vec!["battle".to_string()]);
}

#[tokio::test]
async fn only_the_base_price_range_ignores_discount_bounds() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    // The price range reflects the base filter, not the discount bounds
    let query = ItemQuery {
        cat: Some("medicine".to_string()),
        min_discounted_price: Some(900.0),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    assert_eq!(page.info.count, 1); // only Hyper Potion at 1000
    assert_eq!(page.info.price_range.min, 140.0);
    assert_eq!(page.info.price_range.max, 1000.0);
}

// =============================================================================
// Pagination
// =============================================================================

#[tokio::test]
async fn pagination_links_follow_the_page_position() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        limit: Some(2),
        page: Some(2),
        sort: Some(SortKey::Name),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    assert_eq!(page.info.count, 9);
    assert_eq!(page.info.pages, 5);
    assert_eq!(page.info.page, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.info.prev.as_deref(), Some("/items?page=1"));
    assert_eq!(page.info.first.as_deref(), Some("/items?page=1"));
    assert_eq!(page.info.next.as_deref(), Some("/items?page=3"));
    assert_eq!(page.info.last.as_deref(), Some("/items?page=5"));

    // Last page: a short tail, no next/last
    let query = ItemQuery {
        page: Some(5),
        ..query
    };
    let page = items.list(&query, link).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.info.next, None);
    assert_eq!(page.info.last, None);
    assert_eq!(page.info.prev.as_deref(), Some("/items?page=4"));
}

#[tokio::test]
async fn page_beyond_the_result_set_is_not_found() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    let query = ItemQuery {
        limit: Some(2),
        page: Some(6),
        ..Default::default()
    };
    let err = items.list(&query, link).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");

    // Same rule on the aggregation path
    let query = ItemQuery {
        limit: Some(2),
        page: Some(4),
        min_discounted_price: Some(100.0),
        max_discounted_price: Some(650.0),
        ..Default::default()
    };
    let err = items.list(&query, link).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_store_yields_zeroed_envelope() {
    let (_tmp, items) = setup().await;

    let page = items.list(&ItemQuery::default(), link).await.unwrap();

    assert_eq!(page.info.count, 0);
    assert_eq!(page.info.pages, 0);
    assert!(page.items.is_empty());
    assert_eq!(page.info.price_range.min, 0.0);
    assert_eq!(page.info.price_range.max, 0.0);
    // No links at all: page 1 of 0
    assert_eq!(page.info.prev, None);
    assert_eq!(page.info.next, None);
    assert_eq!(page.info.first, None);
    assert_eq!(page.info.last, None);
    // The fixed categories are still reported
    assert_eq!(page.info.category_count.len(), 8);
    assert!(page.info.category_count.values().all(|&c| c == 0));
}

#[tokio::test]
async fn filters_compose_conjunctively() {
    let (_tmp, items) = setup().await;
    seed(&items).await;

    // healing-tagged AND medicine AND price <= 700
    let query = ItemQuery {
        tag: Some("healing".to_string()),
        cat: Some("medicine".to_string()),
        max_price: Some(700.0),
        ..Default::default()
    };
    let page = items.list(&query, link).await.unwrap();

    let mut got = names(&page);
    got.sort_unstable();
    assert_eq!(got, vec!["Potion", "Super Potion"]);
}
