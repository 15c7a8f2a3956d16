//! Fluent builders returned by [`Validator::rule_for`](crate::Validator::rule_for)
//! and [`Validator::rules_for`](crate::Validator::rules_for).

mod collection;
mod rule_builder;

pub use collection::CollectionRuleBuilder;
pub use rule_builder::RuleBuilder;
