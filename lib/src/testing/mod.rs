mod random;

pub use random::{oracle_for, ClaimFactory, GeneratedClaim};
