use contracts::domain::lead::{Interest, Lead, NewLead, Source, Status, UnknownLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub contact_information: String,
    pub source: String,
    pub interest: String,
    pub status: String,
    pub assigned_salesperson_name: String,
    pub salesperson_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Lead {
    type Error = UnknownLabel;

    fn try_from(m: Model) -> Result<Self, UnknownLabel> {
        Ok(Lead {
            id: m.id,
            name: m.name,
            contact_information: m.contact_information,
            source: Source::parse_label(&m.source)?,
            interest: Interest::parse_label(&m.interest)?,
            status: Status::parse_label(&m.status)?,
            assigned_salesperson_name: m.assigned_salesperson_name,
            salesperson_id: m.salesperson_id,
        })
    }
}

fn active_model_from_new(lead: &NewLead) -> ActiveModel {
    ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        name: Set(lead.name.clone()),
        contact_information: Set(lead.contact_information.clone()),
        source: Set(lead.source.label().to_string()),
        interest: Set(lead.interest.label().to_string()),
        status: Set(lead.status.label().to_string()),
        assigned_salesperson_name: Set(lead.assigned_salesperson_name.clone()),
        salesperson_id: Set(lead.salesperson_id),
    }
}

/// Optional enum filters for the listing endpoint; unset fields match all.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadFilter {
    pub source: Option<Source>,
    pub interest: Option<Interest>,
    pub status: Option<Status>,
}

fn filtered_query(filter: &LeadFilter) -> sea_orm::Select<Entity> {
    let mut query = Entity::find();
    if let Some(source) = filter.source {
        query = query.filter(Column::Source.eq(source.label()));
    }
    if let Some(interest) = filter.interest {
        query = query.filter(Column::Interest.eq(interest.label()));
    }
    if let Some(status) = filter.status {
        query = query.filter(Column::Status.eq(status.label()));
    }
    query
}

/// Page of leads plus the total count under the same filters.
pub async fn list_filtered<C: ConnectionTrait>(
    conn: &C,
    filter: &LeadFilter,
    offset: u64,
    limit: u64,
) -> anyhow::Result<(Vec<Model>, u64)> {
    let total = filtered_query(filter).count(conn).await?;
    let items = filtered_query(filter)
        .order_by_asc(Column::Id)
        .offset(offset)
        .limit(limit)
        .all(conn)
        .await?;
    Ok((items, total))
}

/// Snapshot of every persisted contact identifier, used to seed duplicate
/// detection for an import batch.
pub async fn existing_contacts<C: ConnectionTrait>(conn: &C) -> anyhow::Result<HashSet<String>> {
    let values: Vec<String> = Entity::find()
        .select_only()
        .column(Column::ContactInformation)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(values.into_iter().collect())
}

pub async fn find_id_by_contact<C: ConnectionTrait>(
    conn: &C,
    contact: &str,
) -> anyhow::Result<Option<i32>> {
    let id: Option<i32> = Entity::find()
        .select_only()
        .column(Column::Id)
        .filter(Column::ContactInformation.eq(contact))
        .into_tuple()
        .one(conn)
        .await?;
    Ok(id)
}

/// Bulk insert; the caller guards against an empty batch.
pub async fn insert_many<C: ConnectionTrait>(conn: &C, rows: &[NewLead]) -> anyhow::Result<()> {
    let models: Vec<ActiveModel> = rows.iter().map(active_model_from_new).collect();
    Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

/// Targeted update of a matched lead; the id itself is never part of the
/// update payload.
pub async fn update_by_id<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    lead: &NewLead,
) -> anyhow::Result<()> {
    Entity::update_many()
        .col_expr(Column::Name, Expr::value(lead.name.clone()))
        .col_expr(
            Column::ContactInformation,
            Expr::value(lead.contact_information.clone()),
        )
        .col_expr(Column::Source, Expr::value(lead.source.label()))
        .col_expr(Column::Interest, Expr::value(lead.interest.label()))
        .col_expr(Column::Status, Expr::value(lead.status.label()))
        .col_expr(
            Column::AssignedSalespersonName,
            Expr::value(lead.assigned_salesperson_name.clone()),
        )
        .col_expr(Column::SalespersonId, Expr::value(lead.salesperson_id))
        .filter(Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}
