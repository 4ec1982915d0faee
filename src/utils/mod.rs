pub mod clock;

pub use clock::now_rfc3339;
