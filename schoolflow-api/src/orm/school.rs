//! Database operations for schools (tenants).

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewSchool, School};
use crate::orm::db::last_insert_rowid;
use crate::schema::schools;

/// Status given to a freshly registered school while it is on trial.
pub const TRIAL_STATUS: &str = "pending";

pub fn insert_school(
    conn: &mut SqliteConnection,
    name: &str,
    status: &str,
) -> Result<School, diesel::result::Error> {
    let now = Utc::now().naive_utc();
    let new_school = NewSchool {
        name: name.to_string(),
        status: status.to_string(),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(schools::table)
        .values(&new_school)
        .execute(conn)?;

    let school_id = last_insert_rowid(conn)?;
    schools::table
        .find(school_id)
        .select(School::as_select())
        .first(conn)
}

pub fn get_school(
    conn: &mut SqliteConnection,
    school_id: i32,
) -> Result<Option<School>, diesel::result::Error> {
    schools::table
        .find(school_id)
        .select(School::as_select())
        .first(conn)
        .optional()
}

pub fn list_schools(conn: &mut SqliteConnection) -> Result<Vec<School>, diesel::result::Error> {
    schools::table
        .order(schools::id.asc())
        .select(School::as_select())
        .load(conn)
}

/// Sets a school's status; returns the number of rows updated.
pub fn set_school_status(
    conn: &mut SqliteConnection,
    school_id: i32,
    status: &str,
) -> Result<usize, diesel::result::Error> {
    diesel::update(schools::table.find(school_id))
        .set((
            schools::status.eq(status),
            schools::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_insert_and_update_school() {
        let mut conn = setup_test_db();

        let school = insert_school(&mut conn, "Hillside Academy", TRIAL_STATUS)
            .expect("insert school");
        assert_eq!(school.name, "Hillside Academy");
        assert_eq!(school.status, "pending");

        let updated = set_school_status(&mut conn, school.id, "active").expect("update");
        assert_eq!(updated, 1);

        let reloaded = get_school(&mut conn, school.id)
            .expect("query")
            .expect("school exists");
        assert_eq!(reloaded.status, "active");

        assert_eq!(set_school_status(&mut conn, 9999, "active").expect("update"), 0);
        assert_eq!(list_schools(&mut conn).expect("list").len(), 1);
    }
}
