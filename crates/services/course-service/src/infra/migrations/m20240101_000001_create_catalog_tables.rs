//! Migration: course templates and courses.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CourseTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CourseTemplates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CourseTemplates::TemplateCode)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(CourseTemplates::Name).string().not_null())
                    .col(ColumnDef::new(CourseTemplates::Description).text().not_null())
                    .to_owned(),
            )
            .await?;

        // Course ids are allocated by the application, not by a sequence
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::TemplateId).integer().not_null())
                    .col(ColumnDef::new(Courses::Semester).string_len(10).not_null())
                    .col(ColumnDef::new(Courses::StartDate).date().not_null())
                    .col(ColumnDef::new(Courses::EndDate).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_template_id")
                            .from(Courses::Table, Courses::TemplateId)
                            .to(CourseTemplates::Table, CourseTemplates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_semester")
                    .table(Courses::Table)
                    .col(Courses::Semester)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(CourseTemplates::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum CourseTemplates {
    Table,
    Id,
    TemplateCode,
    Name,
    Description,
}

#[derive(Iden)]
pub(super) enum Courses {
    Table,
    Id,
    TemplateId,
    Semester,
    StartDate,
    EndDate,
}
