use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variant")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub product_id: i32,

    #[sea_orm(belongs_to, from = "product_id", to = "id")]
    pub product: Option<super::product::Entity>,

    pub name: Option<String>,
    pub price: Decimal,

    /// Store-relative path of this variant's image, exclusively owned.
    pub image: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
