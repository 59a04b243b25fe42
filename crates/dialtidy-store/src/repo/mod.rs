pub mod phones;

pub use phones::PhonesRepo;
