pub mod controller;
pub mod cookie;
pub mod router;
pub mod service;
