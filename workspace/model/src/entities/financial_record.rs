use std::fmt;
use std::str::FromStr;

use sea_orm::entity::prelude::*;

/// Whether a ledger entry adds to or subtracts from the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RecordType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Income => "income",
            RecordType::Expense => "expense",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(RecordType::Income),
            "expense" => Ok(RecordType::Expense),
            other => Err(format!("unknown record type: {other}")),
        }
    }
}

/// An entry in the financial ledger.
///
/// Entries are append-only. Income entries are created automatically by
/// sale recording; expense (or manual income) entries are added by an
/// admin. There is no foreign key back to the sale; the ledger is a
/// denormalized one-directional record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub record_type: RecordType,
    /// Strictly positive; the sign lives in `record_type`.
    pub amount: Decimal,
    pub category: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
