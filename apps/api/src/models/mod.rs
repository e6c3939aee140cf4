pub mod business;
pub mod draft;
pub mod recipient;
