pub mod header;
pub mod status;
pub mod warnings;
