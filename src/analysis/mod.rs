/// Analysis layer: singular value decomposition and EOF/regime derivation.

pub mod modes;
pub mod svd;
