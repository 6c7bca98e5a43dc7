use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use super::Identity;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sys_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Identity {
    fn from(m: Model) -> Self {
        Identity {
            id: m.id,
            email: m.email,
            password_hash: m.password_hash,
            is_active: m.is_active,
        }
    }
}

pub async fn find_by_email<C: ConnectionTrait>(
    conn: &C,
    email: &str,
) -> anyhow::Result<Option<Identity>> {
    let result = Entity::find()
        .filter(Column::Email.eq(email))
        .one(conn)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(conn: &C, user: Model) -> anyhow::Result<()> {
    let active = ActiveModel {
        id: Set(user.id),
        email: Set(user.email),
        password_hash: Set(user.password_hash),
        full_name: Set(user.full_name),
        is_active: Set(user.is_active),
        created_at: Set(user.created_at),
        updated_at: Set(user.updated_at),
    };
    active.insert(conn).await?;
    Ok(())
}

pub async fn count_users<C: ConnectionTrait>(conn: &C) -> anyhow::Result<u64> {
    let count = Entity::find().count(conn).await?;
    Ok(count)
}
