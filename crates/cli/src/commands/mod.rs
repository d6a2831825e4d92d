pub mod ask;
pub mod doctor;
pub mod programs;
pub mod serve;
