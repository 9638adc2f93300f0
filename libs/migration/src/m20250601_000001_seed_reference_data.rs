use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Ids are fixed so clients and fixtures can reference them directly
        manager
            .get_connection()
            .execute_unprepared(
                r#"
            INSERT INTO categories (id, title)
            VALUES
                ('bc54bb0c-1d77-48c2-95ea-fd55f691db4c', 'Fiction'),
                ('17ea39ed-3066-44f6-a0c1-d97be6b15de9', 'Literature'),
                ('f0e0164e-a932-4a8b-ba41-291df0d439d5', 'Technology'),
                ('3edb015b-ec4e-45df-8390-b9c66281ab3f', 'History'),
                ('2fa56e3d-d9fb-4453-824a-9094580e5d52', 'Finance')
            ON CONFLICT (id) DO NOTHING
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
            INSERT INTO ratings (id, name)
            VALUES
                ('a3c7d69e-0c07-47db-a0fe-f7eb6160f568', 'Good'),
                ('4bb3890e-2acc-4ebe-9e5f-e0527b4b33cb', 'Average'),
                ('91f9aee4-d7d3-4ea1-b4ba-e6c11c37efe3', 'Bad')
            ON CONFLICT (id) DO NOTHING
            "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
            DELETE FROM ratings WHERE id IN (
                'a3c7d69e-0c07-47db-a0fe-f7eb6160f568',
                '4bb3890e-2acc-4ebe-9e5f-e0527b4b33cb',
                '91f9aee4-d7d3-4ea1-b4ba-e6c11c37efe3'
            )
            "#,
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r#"
            DELETE FROM categories WHERE id IN (
                'bc54bb0c-1d77-48c2-95ea-fd55f691db4c',
                '17ea39ed-3066-44f6-a0c1-d97be6b15de9',
                'f0e0164e-a932-4a8b-ba41-291df0d439d5',
                '3edb015b-ec4e-45df-8390-b9c66281ab3f',
                '2fa56e3d-d9fb-4453-824a-9094580e5d52'
            )
            "#,
            )
            .await?;

        Ok(())
    }
}
