use sea_orm::entity::prelude::*;

/// An item held in inventory.
///
/// `stock` is the number of units currently on hand and must never go
/// negative; sale recording decrements it through a guarded update.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,
    /// Price of a single unit. Non-negative.
    pub unit_price: Decimal,
    /// Units on hand. Non-negative.
    pub stock: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product can be referenced by many sales.
    #[sea_orm(has_many = "super::sale::Entity")]
    Sale,
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sale.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
