// Data models

pub mod draft;
pub mod form;
pub mod payload;
