pub mod sqlite_occurrence_repo;
pub mod sqlite_reservation_repo;
pub mod sqlite_template_repo;
pub mod sqlite_user_repo;

pub mod postgres_occurrence_repo;
pub mod postgres_reservation_repo;
pub mod postgres_template_repo;
pub mod postgres_user_repo;
