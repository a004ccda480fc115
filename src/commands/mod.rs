pub mod build;
pub mod configure;
pub mod doctor;
