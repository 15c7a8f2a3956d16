//! # Inquest
//!
//! Declarative, rule-based validation for typed Rust values.
//!
//! ## Overview
//!
//! A [`Validator`] holds an ordered list of rules for one type. Each rule
//! reads one property through an accessor, checks it, and reports at most one
//! error under that property's path. Rules can be guarded by conditions,
//! grouped, stopped early per path with [`CascadeMode::Stop`], and composed:
//! a validator for `Child` plugs into a rule of `Parent`, and its errors come
//! back as `Wife.Name` or `Children[2].Name`.
//!
//! Evaluation never fails because data is invalid. Invalid data is reported
//! as [`ValidationError`]s inside the returned [`ValidationResult`]s; only
//! cancellation and failing caller closures surface as [`RuleError`].
//!
//! ## Core Types
//!
//! - [`Validator`]: registry and evaluator of rules for one type
//! - [`RuleBuilder`] / [`CollectionRuleBuilder`]: fluent rule construction
//! - [`ValidationResult`]: the errors of one evaluated rule
//! - [`ValidationReport`]: queries over all results of one evaluation
//! - [`FieldPath`]: paths such as `Children[0].Name`
//! - [`ValidationErrors`]: a non-empty error list usable as `std::error::Error`
//!
//! Validators are synchronous ([`SyncRules`]) unless created with
//! [`Validator::new_async`] or converted with [`Validator::into_async`];
//! only those accept asynchronous conditions, and only `validate_async` runs
//! them.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use inquest::{rule_for, rules_for, ComparisonRules, ValidationReport, Validator};
//!
//! struct Person { name: String, age: u32 }
//! struct Family { father: Person, children: Vec<Person> }
//!
//! let mut person = Validator::<Person>::new();
//! rule_for!(person, name)
//!     .unwrap()
//!     .must(|name| !name.is_empty())
//!     .message("name is required");
//! rule_for!(person, age).unwrap().less_than(150);
//! let person = Arc::new(person);
//!
//! let mut family = Validator::<Family>::new();
//! rule_for!(family, father).unwrap().set_validator(Arc::clone(&person));
//! rules_for!(family, children).unwrap().set_validator(person);
//!
//! let family_value = Family {
//!     father: Person { name: String::new(), age: 40 },
//!     children: vec![Person { name: "Bo".into(), age: 200 }],
//! };
//!
//! let results = family.validate(&family_value).unwrap();
//! assert!(!results.is_valid());
//! assert_eq!(results.by_path()["father.name"], vec!["name is required"]);
//! assert_eq!(
//!     results.by_path()["children[0].age"],
//!     vec!["200 is not less than 150"]
//! );
//! ```

pub mod builder;
pub mod cascade;
pub mod error;
pub mod path;
pub mod predicates;
pub mod result;
mod rule;
pub mod validator;

pub use builder::{CollectionRuleBuilder, RuleBuilder};
pub use cascade::CascadeMode;
pub use error::{BoxError, ConfigError, RuleError, ValidationError, ValidationErrors};
pub use path::FieldPath;
pub use predicates::{ChoiceRules, CollectionRules, ComparisonRules, StringRules};
pub use result::{ValidationReport, ValidationResult};
pub use rule::{AsyncNestedValidator, NestedValidator, DEFAULT_MESSAGE};
pub use validator::{AsyncRules, RuleKind, SyncRules, Validator, WhenHandle};
