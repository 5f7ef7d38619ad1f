pub mod auth;
pub mod pix;
