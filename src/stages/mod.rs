pub mod stage0_candidates;
pub mod stage1_filter;
pub mod stage2_select;
pub mod stage3_rank;
pub mod stage4_combine;
pub mod stage_eligibility;

pub use stage0_candidates::*;
pub use stage1_filter::*;
pub use stage2_select::*;
pub use stage3_rank::*;
pub use stage4_combine::*;
pub use stage_eligibility::*;
