pub mod db;
pub mod enhancement_llm;

pub use db::DbAdapter;
pub use enhancement_llm::{DisabledEnhancement, OpenRouterEnhancementAdapter};
