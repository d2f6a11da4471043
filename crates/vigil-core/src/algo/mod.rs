pub mod decompose;
pub mod esd;
pub mod ewma;
pub mod stats;
pub mod student_t;
pub mod zscore;

// Re-exports for convenience
pub use decompose::{Decomposition, decompose_additive};
pub use esd::{EsdOutlier, esd_test, sh_esd, sh_esd_with_significance};
pub use ewma::{Ewma, detect_ewma, ewma};
pub use student_t::{t_cdf, t_quantile};
pub use zscore::{RollingWindow, detect_zscore, detect_zscore_incremental};
