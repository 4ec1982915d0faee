pub mod appointment_service;
pub mod audit_service;
pub mod auth;
pub mod availability_service;
pub mod chat_service;
pub mod consultation_service;
pub mod password_reset_service;
pub mod session_service;
pub mod state_machine;

pub use appointment_service::{AppointmentFeed, AppointmentService};
pub use availability_service::AvailabilityService;
pub use chat_service::{ChatService, MessageFeed};
pub use consultation_service::ConsultationService;
pub use session_service::SessionService;
