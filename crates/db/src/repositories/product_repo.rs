//! Repository for the product catalog.

use chrono::Utc;
use spiral_core::inventory::InventoryStats;
use spiral_core::types::DbId;

use crate::models::product::{CreateProduct, Product, ProductQuery, UpdateProduct};
use crate::repositories::{clamp_limit, clamp_offset};
use crate::Store;

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// List products newest first, filtered by category and search text.
    pub async fn list(store: &Store, query: &ProductQuery) -> Vec<Product> {
        let category = query
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let table = store.tables().products.read().await;
        let mut products: Vec<&Product> = table
            .rows
            .values()
            .filter(|p| {
                category
                    .as_deref()
                    .is_none_or(|c| p.category.to_lowercase() == c)
            })
            .filter(|p| {
                search.as_deref().is_none_or(|s| {
                    p.name.to_lowercase().contains(s)
                        || p.description.to_lowercase().contains(s)
                        || p.category.to_lowercase().contains(s)
                })
            })
            .collect();

        products.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        products
            .into_iter()
            .skip(clamp_offset(query.offset))
            .take(clamp_limit(query.limit))
            .cloned()
            .collect()
    }

    pub async fn find_by_id(store: &Store, id: DbId) -> Option<Product> {
        store.tables().products.read().await.rows.get(&id).cloned()
    }

    /// Insert a validated product, assigning the next id.
    pub async fn create(store: &Store, input: CreateProduct) -> Product {
        let mut table = store.tables().products.write().await;
        let id = table.seq.next();
        let product = Product::from_input(id, input, Utc::now());
        table.rows.insert(id, product.clone());
        product
    }

    /// Insert a batch of validated products under one lock.
    pub async fn create_many(store: &Store, inputs: Vec<CreateProduct>) -> Vec<Product> {
        let now = Utc::now();
        let mut table = store.tables().products.write().await;
        inputs
            .into_iter()
            .map(|input| {
                let id = table.seq.next();
                let product = Product::from_input(id, input, now);
                table.rows.insert(id, product.clone());
                product
            })
            .collect()
    }

    /// Replace a product's fields. Returns `None` if the id is unknown.
    pub async fn update(store: &Store, id: DbId, input: UpdateProduct) -> Option<Product> {
        let mut table = store.tables().products.write().await;
        let slot = table.rows.get_mut(&id)?;
        *slot = Product::from_input(id, input, Utc::now());
        Some(slot.clone())
    }

    /// Remove a product, returning it. `None` if the id is unknown.
    pub async fn delete(store: &Store, id: DbId) -> Option<Product> {
        store.tables().products.write().await.rows.remove(&id)
    }

    pub async fn stats(store: &Store) -> InventoryStats {
        let table = store.tables().products.read().await;
        InventoryStats::compute(
            table
                .rows
                .values()
                .map(|p| (p.price, p.quantity, p.category.as_str())),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use spiral_core::inventory::ProductInput;

    fn input(name: &str, category: &str, quantity: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: 2.5,
            quantity,
            variants: vec![],
            discount: None,
            image_url: String::new(),
            category: category.to_string(),
            sku: String::new(),
            description: format!("{name} description"),
        }
    }

    #[tokio::test]
    async fn list_on_empty_store_is_empty() {
        let store = Store::default();
        assert!(ProductRepo::list(&store, &ProductQuery::default()).await.is_empty());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let store = Store::default();
        ProductRepo::create(&store, input("Mug", "Kitchen", 4)).await;
        ProductRepo::create(&store, input("Lamp", "Home", 12)).await;
        ProductRepo::create(&store, input("Kettle", "kitchen", 1)).await;

        let all = ProductRepo::list(&store, &ProductQuery::default()).await;
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Kettle", "Lamp", "Mug"]);

        let kitchen = ProductRepo::list(
            &store,
            &ProductQuery {
                category: Some("KITCHEN".into()),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(kitchen.len(), 2);

        let everything = ProductRepo::list(
            &store,
            &ProductQuery {
                category: Some("all".into()),
                search: Some("lamp".into()),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(everything.len(), 1);
        assert_eq!(everything[0].name, "Lamp");
    }

    #[tokio::test]
    async fn list_pages_with_limit_and_offset() {
        let store = Store::default();
        let batch = (0..5).map(|i| input(&format!("P{i}"), "X", 1)).collect();
        ProductRepo::create_many(&store, batch).await;

        let page = ProductRepo::list(
            &store,
            &ProductQuery {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            },
        )
        .await;
        let names: Vec<_> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["P3", "P2"]);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids() {
        let store = Store::default();
        assert!(ProductRepo::update(&store, 99, input("X", "", 1)).await.is_none());
        assert!(ProductRepo::delete(&store, 99).await.is_none());

        let created = ProductRepo::create(&store, input("Mug", "Kitchen", 4)).await;
        let updated = ProductRepo::update(&store, created.id, input("Big Mug", "Kitchen", 8))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Big Mug");

        let deleted = ProductRepo::delete(&store, created.id).await.unwrap();
        assert_eq!(deleted.name, "Big Mug");
        assert!(ProductRepo::find_by_id(&store, created.id).await.is_none());
    }

    #[tokio::test]
    async fn stats_reflect_stock() {
        let store = Store::default();
        ProductRepo::create(&store, input("Mug", "Kitchen", 0)).await;
        ProductRepo::create(&store, input("Lamp", "Home", 20)).await;

        let stats = ProductRepo::stats(&store).await;
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.out_of_stock_products, 1);
        assert_eq!(stats.low_stock_products, 1);
        assert_eq!(stats.categories, 2);
        assert_eq!(stats.total_value, 50.0);
    }
}
