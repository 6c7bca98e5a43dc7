use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_persons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub hashed_password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_id_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> anyhow::Result<Option<i32>> {
    let id: Option<i32> = Entity::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::Name.eq(name))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(id)
}

/// Insert a new salesperson and return the assigned id.
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    hashed_password: &str,
) -> anyhow::Result<i32> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(name.to_string()),
        hashed_password: Set(hashed_password.to_string()),
    };
    let model = active.insert(conn).await?;
    Ok(model.id)
}
