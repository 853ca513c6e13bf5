pub mod curve;
pub mod pdb;
