pub mod clean;
pub mod doctor;
pub mod launch;
