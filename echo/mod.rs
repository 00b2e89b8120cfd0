pub mod correlator;

pub use correlator::EchoCorrelator;
