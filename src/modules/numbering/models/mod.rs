mod number_sequence;

pub use number_sequence::NumberSequence;
