pub mod complaint_service;
pub mod health_service;
pub mod publisher;
