// Account signup. Sessions and login are handled outside this service.

pub mod handlers;
pub mod signup;
pub mod store;
