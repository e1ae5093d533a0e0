// handlers/auth/mod.rs - credential endpoints
//
// Every login is a stateless check; no token or session is issued.

pub mod admin;
pub mod developer;
pub mod surveyor;

pub use admin::{list as admins_list, login as admin_login, signup as admin_signup};
pub use developer::login as developer_login;
pub use surveyor::{list as surveyors_list, login as surveyor_login, register as surveyor_register};
