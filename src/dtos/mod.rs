pub mod constructiondtos;
pub mod requestdtos;
