mod assembler;
mod storage;
mod temporal;
mod tree;
mod writer;

pub use self::assembler::Assembler;
pub use self::writer::{contains_related_dataset, write_document};
