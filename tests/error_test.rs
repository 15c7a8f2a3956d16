//! Integration tests for ValidationError, ValidationErrors, and RuleError.

use std::error::Error;

use inquest::{
    rule_for, FieldPath, RuleError, ValidationError, ValidationErrors, ValidationReport,
    Validator,
};
use stillwater::prelude::*;
use stillwater::Validation;

fn error(field: &str, message: &str) -> ValidationError {
    ValidationError::new(FieldPath::from_field(field), message)
}

#[test]
fn test_errors_never_empty() {
    let errors = ValidationErrors::single(error("Name", "required"));

    // is_empty always returns false (guarantees at least one error)
    assert!(!errors.is_empty());
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_errors_combine_via_semigroup() {
    let combined = ValidationErrors::single(error("Name", "name is required"))
        .combine(ValidationErrors::single(error("Email", "email is invalid")))
        .combine(ValidationErrors::single(error("Age", "age must be positive")));

    assert_eq!(combined.len(), 3);

    let messages: Vec<&str> = combined.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["name is required", "email is invalid", "age must be positive"]
    );
}

#[test]
fn test_validation_and_accumulates_errors() {
    let v1: Validation<i32, ValidationErrors> =
        Validation::Failure(ValidationErrors::single(error("a", "error a")));
    let v2: Validation<i32, ValidationErrors> =
        Validation::Failure(ValidationErrors::single(error("b", "error b")));

    match v1.and(v2) {
        Validation::Failure(errors) => {
            assert_eq!(errors.len(), 2);
            let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
            assert_eq!(paths, vec!["a", "b"]);
        }
        Validation::Success(_) => panic!("Expected failure"),
    }
}

struct Signup {
    email: String,
    password: String,
}

fn signup_validator() -> Validator<Signup> {
    let mut validator = Validator::<Signup>::new();
    rule_for!(validator, email)
        .unwrap()
        .must(|email| email.contains('@'))
        .message("email must contain @");
    rule_for!(validator, password)
        .unwrap()
        .must(|password| password.len() >= 8)
        .message("password is too short");
    validator
}

fn register(signup: &Signup) -> Result<String, Box<dyn Error>> {
    signup_validator().validate(signup)?.ensure_valid()?;
    Ok(signup.email.clone())
}

#[test]
fn test_report_converts_into_error_value() {
    let ok = Signup {
        email: "ann@example.com".to_string(),
        password: "correct horse".to_string(),
    };
    assert_eq!(register(&ok).unwrap(), "ann@example.com");

    let bad = Signup {
        email: "ann".to_string(),
        password: "short".to_string(),
    };
    let err = register(&bad).unwrap_err();
    let errors = err.downcast_ref::<ValidationErrors>().expect("validation errors");
    assert_eq!(errors.len(), 2);
    assert!(err.to_string().contains("1. email: email must contain @"));
    assert!(err.to_string().contains("2. password: password is too short"));
}

#[test]
fn test_report_as_stillwater_validation() {
    let bad = Signup {
        email: "ann".to_string(),
        password: "correct horse".to_string(),
    };
    let results = signup_validator().validate(&bad).unwrap();

    match results.to_validation() {
        Validation::Failure(errors) => {
            assert_eq!(errors.first().path, FieldPath::from_field("email"));
        }
        Validation::Success(_) => panic!("Expected failure"),
    }
}

#[test]
fn test_rule_error_keeps_source() {
    #[derive(Debug)]
    struct LookupFailed;

    impl std::fmt::Display for LookupFailed {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "lookup failed")
        }
    }

    impl Error for LookupFailed {}

    let mut validator = Validator::<Signup>::new();
    rule_for!(validator, email)
        .unwrap()
        .try_must(|_, _| Err::<bool, _>(LookupFailed));

    let signup = Signup {
        email: "ann@example.com".to_string(),
        password: String::new(),
    };
    let err = validator.validate(&signup).unwrap_err();

    assert!(matches!(err, RuleError::Predicate { ref path, .. } if path.to_string() == "email"));
    assert!(!err.is_cancelled());
    let source = err.source().expect("source error");
    assert_eq!(source.to_string(), "lookup failed");
}

#[test]
fn test_error_types_are_thread_safe() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<ValidationError>();
    assert_send_sync::<ValidationErrors>();
    assert_send_sync::<RuleError>();
}
