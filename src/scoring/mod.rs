pub mod config;
pub mod eligibility;
pub mod engine;
pub mod factors;
pub mod market;
pub mod recommend;
pub mod result;
pub mod validation;

pub use config::{load_config, EngineConfig, EligibilityRules, ScoringVersion};
pub use eligibility::{check_guest_favorites, EligibilityFailure};
pub use engine::grade_listing;
pub use result::{Category, CategoryScore, GradeResult};
pub use validation::{validate_config, validate_listing};
