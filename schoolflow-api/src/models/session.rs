use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::Role;
use crate::schema::sessions;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = sessions)]
pub struct Session {
    pub id: i32,
    pub token: String, // Opaque random lookup key
    pub user_id: i32,
    pub role: String,
    pub school_id: Option<i32>,
    pub ip_address: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    pub created_at: NaiveDateTime,
    pub expires_at: i64, // Epoch milliseconds
}

impl Session {
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        self.expires_at <= now_millis
    }
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = sessions)]
pub struct NewSession {
    pub token: String,
    pub user_id: i32,
    pub role: String,
    pub school_id: Option<i32>,
    pub ip_address: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    pub created_at: NaiveDateTime,
    pub expires_at: i64,
}

/// The typed view of a live session shared by the route guard and API routes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct SessionData {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub school_id: Option<i32>,
}

/// A session as listed on the security page; never exposes the token.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ActiveSession {
    pub id: i32,
    pub ip_address: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    pub expires_at: i64,
    pub current: bool,
}

impl ActiveSession {
    pub fn from_session(session: Session, current_token: Option<&str>) -> Self {
        let current = current_token == Some(session.token.as_str());
        ActiveSession {
            id: session.id,
            ip_address: session.ip_address,
            device: session.device,
            browser: session.browser,
            os: session.os,
            device_type: session.device_type,
            created_at: session.created_at,
            expires_at: session.expires_at,
            current,
        }
    }
}
