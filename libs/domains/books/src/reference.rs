//! Seeded categories and ratings. The ids match the reference-data migration.

use uuid::{Uuid, uuid};

use crate::models::{Category, Rating};

pub const FICTION: Uuid = uuid!("bc54bb0c-1d77-48c2-95ea-fd55f691db4c");
pub const LITERATURE: Uuid = uuid!("17ea39ed-3066-44f6-a0c1-d97be6b15de9");
pub const TECHNOLOGY: Uuid = uuid!("f0e0164e-a932-4a8b-ba41-291df0d439d5");
pub const HISTORY: Uuid = uuid!("3edb015b-ec4e-45df-8390-b9c66281ab3f");
pub const FINANCE: Uuid = uuid!("2fa56e3d-d9fb-4453-824a-9094580e5d52");

pub const GOOD: Uuid = uuid!("a3c7d69e-0c07-47db-a0fe-f7eb6160f568");
pub const AVERAGE: Uuid = uuid!("4bb3890e-2acc-4ebe-9e5f-e0527b4b33cb");
pub const BAD: Uuid = uuid!("91f9aee4-d7d3-4ea1-b4ba-e6c11c37efe3");

pub fn categories() -> Vec<Category> {
    [
        (FICTION, "Fiction"),
        (LITERATURE, "Literature"),
        (TECHNOLOGY, "Technology"),
        (HISTORY, "History"),
        (FINANCE, "Finance"),
    ]
    .into_iter()
    .map(|(id, title)| Category {
        id,
        title: title.to_string(),
    })
    .collect()
}

pub fn ratings() -> Vec<Rating> {
    [(GOOD, "Good"), (AVERAGE, "Average"), (BAD, "Bad")]
        .into_iter()
        .map(|(id, name)| Rating {
            id,
            name: name.to_string(),
        })
        .collect()
}
