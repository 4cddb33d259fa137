pub mod config;
pub mod health;
pub mod it_staffs;
pub mod schools;
pub mod students;
pub mod teachers;
pub mod users;
