pub mod config;
pub mod domain_utils;
pub mod link_analysis;
pub mod scanner;
pub mod url_utils;

pub use config::{Predicate, Rule, RuleSet};
pub use scanner::{InputError, ScanInput, ScanResult, ScorerEngine};
