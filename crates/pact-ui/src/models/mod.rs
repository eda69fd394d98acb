pub mod calendar_model;
pub mod table_model;
