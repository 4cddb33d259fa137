//! This file serves as the root for all SeaORM entity modules.
//! The data model for the school administration application lives here:
//! a tenant-scoped School owned by a User, with Students, Teachers and
//! IT Staff attached to it. Identifiers are server-assigned UUID strings
//! and every table carries created/updated timestamps.

pub mod it_staff;
pub mod school;
pub mod student;
pub mod teacher;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::it_staff::Entity as ItStaff;
    pub use super::school::Entity as School;
    pub use super::student::Entity as Student;
    pub use super::teacher::Entity as Teacher;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Create users in two different tenants
        let admin = user::ActiveModel {
            email: Set("admin@hillvalley.edu".to_string()),
            tenant_id: Set(Some("tenant-1".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let other_admin = user::ActiveModel {
            email: Set("admin@shermer.edu".to_string()),
            tenant_id: Set(Some("tenant-2".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Identity and timestamps are server-assigned
        assert!(!admin.id.is_empty());
        assert_ne!(admin.id, other_admin.id);
        assert_eq!(admin.created_at, admin.updated_at);

        // Create a school owned by the first admin
        let school = school::ActiveModel {
            name: Set("Hill Valley High".to_string()),
            description: Set(Some("Est. 1903".to_string())),
            user_id: Set(admin.id.clone()),
            tenant_id: Set("tenant-1".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Attach students, a teacher and an IT staff member
        let marty = student::ActiveModel {
            name: Set("Marty McFly".to_string()),
            attendance: Set(Some(74)),
            academic_record: Set(Some(81)),
            user_id: Set(Some(admin.id.clone())),
            school_id: Set(Some(school.id.clone())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let jennifer = student::ActiveModel {
            name: Set("Jennifer Parker".to_string()),
            school_id: Set(Some(school.id.clone())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let strickland = teacher::ActiveModel {
            name: Set("Mr. Strickland".to_string()),
            school_id: Set(Some(school.id.clone())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        it_staff::ActiveModel {
            name: Set("Doc Brown".to_string()),
            school_id: Set(Some(school.id.clone())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Nullable record fields stay absent until tracked
        assert_eq!(jennifer.attendance, None);
        assert_eq!(marty.attendance, Some(74));

        // belongs-to navigation
        let marty_school = marty.find_related(School).one(&db).await?.unwrap();
        assert_eq!(marty_school.id, school.id);
        let school_owner = school.find_related(User).one(&db).await?.unwrap();
        assert_eq!(school_owner.email, "admin@hillvalley.edu");

        // has-many navigation and per-relation counts
        let students = school.find_related(Student).all(&db).await?;
        assert_eq!(students.len(), 2);
        let teacher_count = Teacher::find()
            .filter(teacher::Column::SchoolId.eq(school.id.clone()))
            .count(&db)
            .await?;
        assert_eq!(teacher_count, 1);
        let it_staff_count = ItStaff::find()
            .filter(it_staff::Column::SchoolId.eq(school.id.clone()))
            .count(&db)
            .await?;
        assert_eq!(it_staff_count, 1);

        // Updates refresh updated_at but keep created_at
        let created_at = strickland.created_at;
        let mut active: teacher::ActiveModel = strickland.into();
        active.name = Set("Principal Strickland".to_string());
        let renamed = active.update(&db).await?;
        assert_eq!(renamed.created_at, created_at);
        assert!(renamed.updated_at >= created_at);
        assert_eq!(renamed.name, "Principal Strickland");

        Ok(())
    }
}
