pub mod entrance;
pub mod transfer;
