//! SeaORM entities for the catalog tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod books {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "books")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub description: Option<String>,
        pub author: String,
        pub price: i32,
        pub category_id: Uuid,
        pub rating_id: Uuid,
        #[sea_orm(column_type = "Vector(Some(384))", nullable)]
        pub embedding: Option<PgVector>,
        pub created_at: DateTimeWithTimeZone,
        pub updated_at: DateTimeWithTimeZone,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::categories::Entity",
            from = "Column::CategoryId",
            to = "super::categories::Column::Id"
        )]
        Category,
        #[sea_orm(
            belongs_to = "super::ratings::Entity",
            from = "Column::RatingId",
            to = "super::ratings::Column::Id"
        )]
        Rating,
    }

    impl Related<super::categories::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Category.def()
        }
    }

    impl Related<super::ratings::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Rating.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod categories {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "categories")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub title: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::books::Entity")]
        Books,
    }

    impl Related<super::books::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Books.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Category {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                title: model.title,
            }
        }
    }
}

pub mod ratings {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "ratings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::books::Entity")]
        Books,
    }

    impl Related<super::books::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Books.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::Rating {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                name: model.name,
            }
        }
    }
}
