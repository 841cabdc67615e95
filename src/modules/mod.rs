pub mod attendance;
pub mod auth;
pub mod class_admins;
pub mod classes;
pub mod homework;
pub mod live_classes;
pub mod schools;
pub mod subjects;
pub mod teachers;
pub mod templates;
pub mod timetable;
pub mod users;
