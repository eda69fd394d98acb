pub mod calendar_service;
pub mod table_service;

pub use calendar_service::{
    request_fetch as request_calendar_fetch, CalendarError, CalendarServiceMessage,
};
pub use table_service::{
    request_create as request_table_create, request_delete as request_table_delete,
    request_fetch as request_table_fetch, request_update as request_table_update, TableError,
    TableServiceMessage,
};
