use uuid::Uuid;

pub use company::*;
pub use feedback::*;
pub use qr_code::*;
pub use rating::*;
pub use timestamp::*;
pub use user::*;

mod company;
mod feedback;
mod qr_code;
mod rating;
mod timestamp;
mod user;

/// A fresh random identifier for a new record.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
