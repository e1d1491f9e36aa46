use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// JSON-encoded list of strings (display options, image references).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct StringList(pub Vec<String>);

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub category_id: i32,

    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: Option<super::category::Entity>,

    pub brand: Option<String>,
    pub name: String,
    pub description: String,

    /// Display options, insertion order preserved.
    #[sea_orm(column_type = "Json")]
    pub options: StringList,

    pub price: Decimal,
    pub discount: Option<Decimal>,

    /// Ordered canonical image references (store-relative paths).
    #[sea_orm(column_type = "Json")]
    pub images: StringList,

    #[sea_orm(has_many)]
    pub variants: HasMany<super::variant::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
