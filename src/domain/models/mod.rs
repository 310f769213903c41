pub mod authenticated_user;
pub mod token;
