pub mod culture; // Raw report text -> one summary line per culture block
pub mod filter; // Antibiotic filtering over rendered summary lines

pub use culture::parse;
pub use filter::filter;
