pub mod sddmm;
pub mod segment;
pub mod spmm;
