pub mod dashboard;
pub mod expenses;
pub mod news;
pub mod portfolio;
pub mod ui;
