//! Course database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Course;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Allocated by the application as max(id) + 1
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub template_id: i32,
    pub semester: String,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course_template::Entity",
        from = "Column::TemplateId",
        to = "super::course_template::Column::Id",
        on_delete = "Restrict"
    )]
    CourseTemplate,
    #[sea_orm(has_many = "super::student_enrollment::Entity")]
    StudentEnrollment,
}

impl Related<super::course_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CourseTemplate.def()
    }
}

impl Related<super::student_enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentEnrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Course {
    fn from(model: Model) -> Self {
        Course {
            id: model.id,
            template_id: model.template_id,
            semester: model.semester,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}
