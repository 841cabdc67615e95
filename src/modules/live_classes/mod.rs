pub mod controller;
pub mod router;
pub mod service;

pub use router::init_live_classes_router;
