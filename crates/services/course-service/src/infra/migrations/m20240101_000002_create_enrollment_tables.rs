//! Migration: students and student enrollments.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_catalog_tables::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Students::Ssn)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        // No unique key on (student_id, course_id): repeat enrollments are allowed
        manager
            .create_table(
                Table::create()
                    .table(StudentEnrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudentEnrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudentEnrollments::StudentId).integer().not_null())
                    .col(ColumnDef::new(StudentEnrollments::CourseId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollments_student_id")
                            .from(StudentEnrollments::Table, StudentEnrollments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_enrollments_course_id")
                            .from(StudentEnrollments::Table, StudentEnrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_enrollments_course_id")
                    .table(StudentEnrollments::Table)
                    .col(StudentEnrollments::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StudentEnrollments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    Ssn,
    Name,
}

#[derive(Iden)]
enum StudentEnrollments {
    Table,
    Id,
    StudentId,
    CourseId,
}
