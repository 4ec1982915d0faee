pub mod user;
pub mod session;
pub mod chat;
pub mod message;
pub mod appointment;
pub mod availability;
pub mod consultation;
pub mod audit;

pub use user::*;
pub use session::*;
pub use chat::*;
pub use message::*;
pub use appointment::*;
pub use availability::*;
pub use consultation::*;
pub use audit::*;
