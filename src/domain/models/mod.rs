pub mod occurrence;
pub mod reservation;
pub mod template;
pub mod user;
