use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::{AccountStatus, Role};
use crate::schema::{school_admins, super_admins, teachers};

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = super_admins)]
#[ts(export)]
pub struct SuperAdmin {
    pub id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub status: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = super_admins)]
pub struct NewSuperAdmin {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = school_admins)]
#[ts(export)]
pub struct SchoolAdmin {
    pub id: i32,
    pub school_id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub status: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = school_admins)]
pub struct NewSchoolAdmin {
    pub school_id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, TS)]
#[diesel(table_name = teachers)]
#[ts(export)]
pub struct Teacher {
    pub id: i32,
    pub school_id: i32,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    #[ts(skip)]
    pub password_hash: String,
    pub status: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = teachers)]
pub struct NewTeacher {
    pub school_id: i32,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input for creating any kind of principal; timestamps are filled in by the ORM.
#[derive(Debug, Clone, Deserialize)]
pub struct PrincipalInput {
    pub role: Role,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub status: AccountStatus,
    /// Required for school admins and teachers, ignored for super admins.
    pub school_id: Option<i32>,
}

/// An authenticated entity that can hold a session.
#[derive(Debug, Clone)]
pub enum Principal {
    SuperAdmin(SuperAdmin),
    SchoolAdmin(SchoolAdmin),
    Teacher(Teacher),
}

impl Principal {
    pub fn id(&self) -> i32 {
        match self {
            Principal::SuperAdmin(p) => p.id,
            Principal::SchoolAdmin(p) => p.id,
            Principal::Teacher(p) => p.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::SuperAdmin(_) => Role::SuperAdmin,
            Principal::SchoolAdmin(_) => Role::SchoolAdmin,
            Principal::Teacher(_) => Role::Teacher,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::SuperAdmin(p) => &p.email,
            Principal::SchoolAdmin(p) => &p.email,
            Principal::Teacher(p) => &p.email,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Principal::SuperAdmin(p) => &p.name,
            Principal::SchoolAdmin(p) => &p.name,
            Principal::Teacher(p) => &p.name,
        }
    }

    pub fn school_id(&self) -> Option<i32> {
        match self {
            Principal::SuperAdmin(_) => None,
            Principal::SchoolAdmin(p) => Some(p.school_id),
            Principal::Teacher(p) => Some(p.school_id),
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::SuperAdmin(p) => &p.password_hash,
            Principal::SchoolAdmin(p) => &p.password_hash,
            Principal::Teacher(p) => &p.password_hash,
        }
    }

    pub fn status(&self) -> AccountStatus {
        let stored = match self {
            Principal::SuperAdmin(p) => &p.status,
            Principal::SchoolAdmin(p) => &p.status,
            Principal::Teacher(p) => &p.status,
        };
        AccountStatus::from_stored(stored)
    }
}
