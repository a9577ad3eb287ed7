pub mod batch;
pub mod collect;
pub mod doctor;
pub mod plan;
pub mod scripts;
