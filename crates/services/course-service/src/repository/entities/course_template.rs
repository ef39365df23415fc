//! Course template database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::CourseTemplate;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "course_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Human-assigned business code
    #[sea_orm(unique)]
    pub template_code: String,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::course::Entity")]
    Course,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for CourseTemplate {
    fn from(model: Model) -> Self {
        CourseTemplate {
            id: model.id,
            template_code: model.template_code,
            name: model.name,
            description: model.description,
        }
    }
}
