pub mod admin_handler;
pub mod incident_handler;
