pub mod doctor;
pub mod reset;
pub mod status;
