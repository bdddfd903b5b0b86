pub mod analysis_results;
pub mod dish_analysis;
pub mod errors;
pub mod menu_item;
pub mod ocr_result;
pub mod user_profile;

pub use analysis_results::*;
pub use dish_analysis::*;
pub use errors::*;
pub use menu_item::*;
pub use ocr_result::*;
pub use user_profile::*;
