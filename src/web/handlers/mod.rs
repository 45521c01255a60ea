pub mod system;
pub mod users;
pub mod goals;
pub mod values;
