//! Inventory operations: product CRUD, search and category listing.
//!
//! Every mutating operation takes the acting role explicitly and checks
//! the authorization table before touching the store.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument};

use model::entities::product;
use model::entities::user::Role;

use crate::auth::{self, Operation};
use crate::error::{OpsError, Result};

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub unit_price: Decimal,
    pub stock: i32,
}

/// Partial update for an existing product. `None` fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Decimal>,
    pub stock: Option<i32>,
}

/// Optional filters for the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring match against name or category.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
}

fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OpsError::validation("product name must not be blank"));
    }
    Ok(name)
}

fn validate_price(price: Decimal) -> Result<Decimal> {
    if price < Decimal::ZERO {
        return Err(OpsError::validation("unit price must not be negative"));
    }
    Ok(price)
}

fn validate_stock(stock: i32) -> Result<i32> {
    if stock < 0 {
        return Err(OpsError::validation("stock must not be negative"));
    }
    Ok(stock)
}

/// Adds a product to inventory. Allowed for admin and manager.
#[instrument(skip(db))]
pub async fn create_product(
    db: &DatabaseConnection,
    new: NewProduct,
    actor: Role,
) -> Result<product::Model> {
    auth::require(actor, Operation::AddProduct)?;

    let name = validate_name(&new.name)?.to_string();
    let category = validate_name(&new.category)
        .map_err(|_| OpsError::validation("product category must not be blank"))?
        .to_string();
    let unit_price = validate_price(new.unit_price)?;
    let stock = validate_stock(new.stock)?;

    let created = product::ActiveModel {
        name: Set(name),
        category: Set(category),
        unit_price: Set(unit_price),
        stock: Set(stock),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("product {} '{}' created", created.id, created.name);
    Ok(created)
}

/// Edits an existing product. Admin only.
#[instrument(skip(db))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i32,
    update: ProductUpdate,
    actor: Role,
) -> Result<product::Model> {
    auth::require(actor, Operation::EditProduct)?;

    let existing = product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| OpsError::not_found("product", product_id))?;

    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active.name = Set(validate_name(&name)?.to_string());
    }
    if let Some(category) = update.category {
        active.category = Set(validate_name(&category)
            .map_err(|_| OpsError::validation("product category must not be blank"))?
            .to_string());
    }
    if let Some(price) = update.unit_price {
        active.unit_price = Set(validate_price(price)?);
    }
    if let Some(stock) = update.stock {
        active.stock = Set(validate_stock(stock)?);
    }

    let updated = active.update(db).await?;
    debug!("product {} updated", updated.id);
    Ok(updated)
}

/// Deletes a product. Admin only. Sales rows referencing the product are
/// removed by the foreign key; ledger entries are denormalized and stay.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i32, actor: Role) -> Result<()> {
    auth::require(actor, Operation::DeleteProduct)?;

    let result = product::Entity::delete_by_id(product_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(OpsError::not_found("product", product_id));
    }
    info!("product {} deleted", product_id);
    Ok(())
}

/// Fetches one product by id.
pub async fn get_product(db: &DatabaseConnection, product_id: i32) -> Result<product::Model> {
    product::Entity::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| OpsError::not_found("product", product_id))
}

/// Lists products, newest first, with optional search and category filters.
#[instrument(skip(db))]
pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<Vec<product::Model>> {
    let mut query = product::Entity::find();

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(product::Column::Name.contains(term))
                .add(product::Column::Category.contains(term)),
        );
    }
    if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
        query = query.filter(product::Column::Category.eq(category));
    }

    Ok(query.order_by_desc(product::Column::Id).all(db).await?)
}

/// Distinct product categories, alphabetical.
pub async fn categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    let rows: Vec<String> = product::Entity::find()
        .select_only()
        .column(product::Column::Category)
        .distinct()
        .order_by_asc(product::Column::Category)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn widget(name: &str, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: category.to_string(),
            unit_price: Decimal::new(999, 2),
            stock: 20,
        }
    }

    #[tokio::test]
    async fn manager_can_add_but_not_edit_or_delete() {
        let db = setup_db().await;

        let created = create_product(&db, widget("Desk lamp", "Electronics"), Role::Manager)
            .await
            .unwrap();

        let err = update_product(
            &db,
            created.id,
            ProductUpdate {
                stock: Some(5),
                ..Default::default()
            },
            Role::Manager,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized { .. }));

        let err = delete_product(&db, created.id, Role::Manager).await.unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn cashier_cannot_add_products() {
        let db = setup_db().await;
        let err = create_product(&db, widget("Desk lamp", "Electronics"), Role::Cashier)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn creation_rejects_blank_or_negative_input() {
        let db = setup_db().await;

        let err = create_product(&db, widget("   ", "Electronics"), Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));

        let mut negative_price = widget("Desk lamp", "Electronics");
        negative_price.unit_price = Decimal::new(-1, 2);
        let err = create_product(&db, negative_price, Role::Admin).await.unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));

        let mut negative_stock = widget("Desk lamp", "Electronics");
        negative_stock.stock = -3;
        let err = create_product(&db, negative_stock, Role::Admin).await.unwrap_err();
        assert!(matches!(err, OpsError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_filters_by_search_and_category() {
        let db = setup_db().await;
        create_product(&db, widget("Desk lamp", "Electronics"), Role::Admin)
            .await
            .unwrap();
        create_product(&db, widget("Floor lamp", "Electronics"), Role::Admin)
            .await
            .unwrap();
        create_product(&db, widget("Wool scarf", "Clothing"), Role::Admin)
            .await
            .unwrap();

        let all = list_products(&db, ProductFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].name, "Wool scarf");

        let lamps = list_products(
            &db,
            ProductFilter {
                search: Some("lamp".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(lamps.len(), 2);

        let clothing = list_products(
            &db,
            ProductFilter {
                category: Some("Clothing".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(clothing.len(), 1);
        assert_eq!(clothing[0].name, "Wool scarf");

        let cats = categories(&db).await.unwrap();
        assert_eq!(cats, vec!["Clothing".to_string(), "Electronics".to_string()]);
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let db = setup_db().await;
        let created = create_product(&db, widget("Desk lamp", "Electronics"), Role::Admin)
            .await
            .unwrap();

        let updated = update_product(
            &db,
            created.id,
            ProductUpdate {
                unit_price: Some(Decimal::new(1499, 2)),
                stock: Some(7),
                ..Default::default()
            },
            Role::Admin,
        )
        .await
        .unwrap();
        assert_eq!(updated.unit_price, Decimal::new(1499, 2));
        assert_eq!(updated.stock, 7);
        assert_eq!(updated.name, "Desk lamp");

        delete_product(&db, created.id, Role::Admin).await.unwrap();
        let err = get_product(&db, created.id).await.unwrap_err();
        assert!(matches!(err, OpsError::NotFound { .. }));

        let err = delete_product(&db, created.id, Role::Admin).await.unwrap_err();
        assert!(matches!(err, OpsError::NotFound { .. }));
    }
}
