pub mod admins;
pub mod draw;
pub mod init;
pub mod session;
pub mod status;
pub mod steps;
