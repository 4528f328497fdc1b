//! Database operations for the three principal tables.
//!
//! Super admins, school admins and teachers live in separate tables. Every
//! function here takes a [`Role`] (or returns a [`Principal`]) and matches on
//! it exhaustively, so adding a role forces each query to be revisited.

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{
    AccountStatus, NewSchoolAdmin, NewSuperAdmin, NewTeacher, Principal, PrincipalInput, Role,
    SchoolAdmin, SuperAdmin, Teacher,
};
use crate::orm::db::last_insert_rowid;
use crate::schema::{school_admins, super_admins, teachers};

/// Error returned when a school-scoped principal is created without a school.
fn missing_school_error() -> diesel::result::Error {
    diesel::result::Error::QueryBuilderError("school_id is required for this role".into())
}

/// Inserts a principal into the table selected by `input.role`.
pub fn insert_principal(
    conn: &mut SqliteConnection,
    input: PrincipalInput,
) -> Result<Principal, diesel::result::Error> {
    let now = Utc::now().naive_utc();
    let status = input.status.as_str().to_string();

    match input.role {
        Role::SuperAdmin => {
            let row = NewSuperAdmin {
                email: input.email,
                name: input.name,
                password_hash: input.password_hash,
                status,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(super_admins::table)
                .values(&row)
                .execute(conn)?;
        }
        Role::SchoolAdmin => {
            let row = NewSchoolAdmin {
                school_id: input.school_id.ok_or_else(missing_school_error)?,
                email: input.email,
                name: input.name,
                password_hash: input.password_hash,
                status,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(school_admins::table)
                .values(&row)
                .execute(conn)?;
        }
        Role::Teacher => {
            let row = NewTeacher {
                school_id: input.school_id.ok_or_else(missing_school_error)?,
                email: input.email,
                name: input.name,
                password_hash: input.password_hash,
                status,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(teachers::table)
                .values(&row)
                .execute(conn)?;
        }
    }

    let id = last_insert_rowid(conn)?;
    find_principal(conn, input.role, id)?.ok_or(diesel::result::Error::NotFound)
}

/// Loads the live principal record a session points at.
pub fn find_principal(
    conn: &mut SqliteConnection,
    role: Role,
    principal_id: i32,
) -> Result<Option<Principal>, diesel::result::Error> {
    let principal = match role {
        Role::SuperAdmin => super_admins::table
            .find(principal_id)
            .select(SuperAdmin::as_select())
            .first(conn)
            .optional()?
            .map(Principal::SuperAdmin),
        Role::SchoolAdmin => school_admins::table
            .find(principal_id)
            .select(SchoolAdmin::as_select())
            .first(conn)
            .optional()?
            .map(Principal::SchoolAdmin),
        Role::Teacher => teachers::table
            .find(principal_id)
            .select(Teacher::as_select())
            .first(conn)
            .optional()?
            .map(Principal::Teacher),
    };
    Ok(principal)
}

/// Finds a principal of the given role by email address.
pub fn find_principal_by_email(
    conn: &mut SqliteConnection,
    role: Role,
    email: &str,
) -> Result<Option<Principal>, diesel::result::Error> {
    let principal = match role {
        Role::SuperAdmin => super_admins::table
            .filter(super_admins::email.eq(email))
            .select(SuperAdmin::as_select())
            .first(conn)
            .optional()?
            .map(Principal::SuperAdmin),
        Role::SchoolAdmin => school_admins::table
            .filter(school_admins::email.eq(email))
            .select(SchoolAdmin::as_select())
            .first(conn)
            .optional()?
            .map(Principal::SchoolAdmin),
        Role::Teacher => teachers::table
            .filter(teachers::email.eq(email))
            .select(Teacher::as_select())
            .first(conn)
            .optional()?
            .map(Principal::Teacher),
    };
    Ok(principal)
}

/// Finds a staff principal (super admin first, then school admin) by email.
///
/// Staff share the primary login page; teachers log in separately.
pub fn find_staff_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Principal>, diesel::result::Error> {
    if let Some(principal) = find_principal_by_email(conn, Role::SuperAdmin, email)? {
        return Ok(Some(principal));
    }
    find_principal_by_email(conn, Role::SchoolAdmin, email)
}

/// Returns true if any principal table already holds this email.
pub fn email_in_use(conn: &mut SqliteConnection, email: &str) -> Result<bool, diesel::result::Error> {
    for role in Role::ALL {
        if find_principal_by_email(conn, role, email)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn list_principals(
    conn: &mut SqliteConnection,
    role: Role,
) -> Result<Vec<Principal>, diesel::result::Error> {
    let principals = match role {
        Role::SuperAdmin => super_admins::table
            .order(super_admins::id.asc())
            .select(SuperAdmin::as_select())
            .load(conn)?
            .into_iter()
            .map(Principal::SuperAdmin)
            .collect(),
        Role::SchoolAdmin => school_admins::table
            .order(school_admins::id.asc())
            .select(SchoolAdmin::as_select())
            .load(conn)?
            .into_iter()
            .map(Principal::SchoolAdmin)
            .collect(),
        Role::Teacher => teachers::table
            .order(teachers::id.asc())
            .select(Teacher::as_select())
            .load(conn)?
            .into_iter()
            .map(Principal::Teacher)
            .collect(),
    };
    Ok(principals)
}

/// Sets a principal's account status; returns the number of rows updated.
///
/// Existing sessions are left untouched, so a suspended principal keeps a
/// valid session until it expires or is logged out.
pub fn set_principal_status(
    conn: &mut SqliteConnection,
    role: Role,
    principal_id: i32,
    status: AccountStatus,
) -> Result<usize, diesel::result::Error> {
    let now = Utc::now().naive_utc();
    match role {
        Role::SuperAdmin => diesel::update(super_admins::table.find(principal_id))
            .set((
                super_admins::status.eq(status.as_str()),
                super_admins::updated_at.eq(now),
            ))
            .execute(conn),
        Role::SchoolAdmin => diesel::update(school_admins::table.find(principal_id))
            .set((
                school_admins::status.eq(status.as_str()),
                school_admins::updated_at.eq(now),
            ))
            .execute(conn),
        Role::Teacher => diesel::update(teachers::table.find(principal_id))
            .set((
                teachers::status.eq(status.as_str()),
                teachers::updated_at.eq(now),
            ))
            .execute(conn),
    }
}

/// Replaces a principal's password hash; returns the number of rows updated.
pub fn set_password_hash(
    conn: &mut SqliteConnection,
    role: Role,
    principal_id: i32,
    password_hash: &str,
) -> Result<usize, diesel::result::Error> {
    let now = Utc::now().naive_utc();
    match role {
        Role::SuperAdmin => diesel::update(super_admins::table.find(principal_id))
            .set((
                super_admins::password_hash.eq(password_hash),
                super_admins::updated_at.eq(now),
            ))
            .execute(conn),
        Role::SchoolAdmin => diesel::update(school_admins::table.find(principal_id))
            .set((
                school_admins::password_hash.eq(password_hash),
                school_admins::updated_at.eq(now),
            ))
            .execute(conn),
        Role::Teacher => diesel::update(teachers::table.find(principal_id))
            .set((
                teachers::password_hash.eq(password_hash),
                teachers::updated_at.eq(now),
            ))
            .execute(conn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::school::insert_school;
    use crate::orm::testing::setup_test_db;

    fn input(role: Role, email: &str, school_id: Option<i32>) -> PrincipalInput {
        PrincipalInput {
            role,
            email: email.to_string(),
            name: "Test Person".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            status: AccountStatus::Active,
            school_id,
        }
    }

    #[test]
    fn test_insert_each_role() {
        let mut conn = setup_test_db();
        let school = insert_school(&mut conn, "Riverside High", "active").expect("school");

        let root = insert_principal(&mut conn, input(Role::SuperAdmin, "root@sf.test", None))
            .expect("super admin");
        assert_eq!(root.role(), Role::SuperAdmin);
        assert_eq!(root.school_id(), None);

        let admin = insert_principal(
            &mut conn,
            input(Role::SchoolAdmin, "head@riverside.test", Some(school.id)),
        )
        .expect("school admin");
        assert_eq!(admin.role(), Role::SchoolAdmin);
        assert_eq!(admin.school_id(), Some(school.id));

        let teacher = insert_principal(
            &mut conn,
            input(Role::Teacher, "maths@riverside.test", Some(school.id)),
        )
        .expect("teacher");
        assert_eq!(teacher.role(), Role::Teacher);
        assert_eq!(teacher.status(), AccountStatus::Active);
    }

    #[test]
    fn test_school_scoped_role_requires_school() {
        let mut conn = setup_test_db();
        let result = insert_principal(&mut conn, input(Role::Teacher, "t@x.test", None));
        assert!(result.is_err());
    }

    #[test]
    fn test_ids_overlap_across_tables() {
        let mut conn = setup_test_db();
        let school = insert_school(&mut conn, "Overlap School", "active").expect("school");
        let root = insert_principal(&mut conn, input(Role::SuperAdmin, "a@x.test", None)).unwrap();
        let admin = insert_principal(
            &mut conn,
            input(Role::SchoolAdmin, "b@x.test", Some(school.id)),
        )
        .unwrap();

        // Same numeric id, different principals: the role picks the table.
        assert_eq!(root.id(), admin.id());
        let found = find_principal(&mut conn, Role::SchoolAdmin, admin.id())
            .unwrap()
            .unwrap();
        assert_eq!(found.email(), "b@x.test");
    }

    #[test]
    fn test_staff_lookup_and_email_in_use() {
        let mut conn = setup_test_db();
        let school = insert_school(&mut conn, "Lookup School", "active").expect("school");
        insert_principal(&mut conn, input(Role::SchoolAdmin, "admin@x.test", Some(school.id)))
            .unwrap();
        insert_principal(&mut conn, input(Role::Teacher, "teacher@x.test", Some(school.id)))
            .unwrap();

        let staff = find_staff_by_email(&mut conn, "admin@x.test").unwrap();
        assert_eq!(staff.map(|p| p.role()), Some(Role::SchoolAdmin));
        assert!(find_staff_by_email(&mut conn, "teacher@x.test").unwrap().is_none());

        assert!(email_in_use(&mut conn, "teacher@x.test").unwrap());
        assert!(!email_in_use(&mut conn, "nobody@x.test").unwrap());
    }

    #[test]
    fn test_status_and_password_updates() {
        let mut conn = setup_test_db();
        let school = insert_school(&mut conn, "Status School", "active").expect("school");
        let teacher =
            insert_principal(&mut conn, input(Role::Teacher, "t@x.test", Some(school.id)))
                .unwrap();

        let rows =
            set_principal_status(&mut conn, Role::Teacher, teacher.id(), AccountStatus::Suspended)
                .unwrap();
        assert_eq!(rows, 1);
        set_password_hash(&mut conn, Role::Teacher, teacher.id(), "new-hash").unwrap();

        let reloaded = find_principal(&mut conn, Role::Teacher, teacher.id())
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status(), AccountStatus::Suspended);
        assert_eq!(reloaded.password_hash(), "new-hash");
        assert_eq!(list_principals(&mut conn, Role::Teacher).unwrap().len(), 1);
    }
}
