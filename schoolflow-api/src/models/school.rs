use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use ts_rs::TS;

use crate::schema::schools;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = schools)]
#[ts(export)]
pub struct School {
    pub id: i32,
    pub name: String,
    pub status: String, // Subscription state: pending (trial), active, suspended
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = schools)]
pub struct NewSchool {
    pub name: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
