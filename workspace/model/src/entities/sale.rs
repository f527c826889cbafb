use sea_orm::entity::prelude::*;

/// A recorded sale transaction.
///
/// Sales are written once by the sale-recording operation and never
/// updated or deleted afterwards. `total_price` is computed server-side
/// at write time (`quantity * unit_price`), never trusted from a caller.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub customer_name: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub sale_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A sale references exactly one product. The reverse direction
    /// ("sales of this product") is an explicit query, not a live graph.
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
