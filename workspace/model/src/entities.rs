//! This file serves as the root for all SeaORM entity modules.
//! The data models cover the four tables of the retail ERP schema:
//! inventory, sales, users and the financial ledger.

pub mod financial_record;
pub mod product;
pub mod sale;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::financial_record::Entity as FinancialRecord;
    pub use super::product::Entity as Product;
    pub use super::sale::Entity as Sale;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let now = Utc::now();

        // Create users with each role
        let admin = user::ActiveModel {
            username: Set("admin".to_string()),
            password_hash: Set("0".repeat(64)),
            role: Set(user::Role::Admin),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let cashier = user::ActiveModel {
            username: Set("cashier1".to_string()),
            password_hash: Set("0".repeat(64)),
            role: Set(user::Role::Cashier),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create products
        let keyboard = product::ActiveModel {
            name: Set("Mechanical keyboard".to_string()),
            category: Set("Electronics".to_string()),
            unit_price: Set(Decimal::new(7999, 2)), // 79.99
            stock: Set(25),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let tshirt = product::ActiveModel {
            name: Set("Plain t-shirt".to_string()),
            category: Set("Clothing".to_string()),
            unit_price: Set(Decimal::new(1250, 2)), // 12.50
            stock: Set(100),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a sale of the keyboard
        let sale = sale::ActiveModel {
            product_id: Set(keyboard.id),
            customer_name: Set("Alice".to_string()),
            quantity: Set(2),
            total_price: Set(Decimal::new(15998, 2)), // 159.98
            sale_date: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Matching ledger entry
        let income = financial_record::ActiveModel {
            record_type: Set(financial_record::RecordType::Income),
            amount: Set(Decimal::new(15998, 2)),
            category: Set("Electronics".to_string()),
            description: Set("Sale of 2 x Mechanical keyboard to Alice".to_string()),
            recorded_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "admin" && u.role == user::Role::Admin));
        assert_eq!(admin.role, user::Role::Admin);
        assert_eq!(cashier.role, user::Role::Cashier);

        let products = Product::find().all(&db).await?;
        assert_eq!(products.len(), 2);
        assert!(products.iter().any(|p| p.name == "Plain t-shirt"));
        assert_eq!(tshirt.stock, 100);

        let sales = Sale::find().all(&db).await?;
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].product_id, keyboard.id);
        assert_eq!(sales[0].total_price, Decimal::new(15998, 2));

        let records = FinancialRecord::find().all(&db).await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, financial_record::RecordType::Income);
        assert_eq!(records[0].amount, income.amount);

        // The product side of a sale is reachable through the relation
        let sold_product = sale
            .find_related(Product)
            .one(&db)
            .await?
            .expect("sale references a product");
        assert_eq!(sold_product.id, keyboard.id);

        // "Sales of this product" is a plain filtered query
        let keyboard_sales = Sale::find()
            .filter(sale::Column::ProductId.eq(keyboard.id))
            .all(&db)
            .await?;
        assert_eq!(keyboard_sales.len(), 1);

        // The FK rejects sales that reference a missing product
        let orphan = sale::ActiveModel {
            product_id: Set(9999),
            customer_name: Set("Nobody".to_string()),
            quantity: Set(1),
            total_price: Set(Decimal::new(100, 2)),
            sale_date: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(orphan.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_username_is_unique() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let now = Utc::now();

        user::ActiveModel {
            username: Set("admin".to_string()),
            password_hash: Set("0".repeat(64)),
            role: Set(user::Role::Admin),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let duplicate = user::ActiveModel {
            username: Set("admin".to_string()),
            password_hash: Set("1".repeat(64)),
            role: Set(user::Role::Cashier),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err());

        Ok(())
    }
}
