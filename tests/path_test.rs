//! Integration tests for the paths errors are reported under.

use std::collections::HashSet;
use std::sync::Arc;

use inquest::{rule_for, rules_for, ConfigError, FieldPath, ValidationReport, Validator};

struct Address {
    city: String,
}

struct Person {
    name: String,
    address: Address,
}

struct Household {
    members: Vec<Person>,
}

fn household() -> Household {
    Household {
        members: vec![
            Person {
                name: "Ann".to_string(),
                address: Address {
                    city: "Oslo".to_string(),
                },
            },
            Person {
                name: String::new(),
                address: Address {
                    city: String::new(),
                },
            },
        ],
    }
}

fn household_validator() -> Validator<Household> {
    let mut address = Validator::<Address>::new();
    rule_for!(address, city)
        .unwrap()
        .must(|c| !c.is_empty())
        .message("city is required");

    let mut person = Validator::<Person>::new();
    rule_for!(person, name)
        .unwrap()
        .must(|n| !n.is_empty())
        .message("name is required");
    rule_for!(person, address)
        .unwrap()
        .set_validator(Arc::new(address));

    let mut validator = Validator::<Household>::new();
    rules_for!(validator, members)
        .unwrap()
        .set_validator(Arc::new(person));
    validator
}

#[test]
fn test_nested_paths_compose_member_index_member() {
    let results = household_validator().validate(&household()).unwrap();
    let paths: Vec<String> = results.errors().map(|e| e.path.to_string()).collect();

    assert_eq!(paths, vec!["members[1].name", "members[1].address.city"]);
    assert!(results.errors().all(|e| e.path.head() == Some("members")));
}

#[test]
fn test_path_building_does_not_mutate_base() {
    let base = FieldPath::from_field("Children");

    let first = base.push_index(0);
    let second = base.push_index(1);

    assert_eq!(base.to_string(), "Children");
    assert_eq!(first.to_string(), "Children[0]");
    assert_eq!(second.to_string(), "Children[1]");
}

#[test]
fn test_join_composes_nested_paths() {
    let prefix = FieldPath::from_field("Children").push_index(3);
    let nested = FieldPath::from_field("Wife").join(&FieldPath::from_field("Name"));

    assert_eq!(prefix.join(&nested).to_string(), "Children[3].Wife.Name");
    assert_eq!(FieldPath::root().join(&nested), nested);
    assert_eq!(nested.join(&FieldPath::root()), nested);
}

#[test]
fn test_property_names() {
    assert_eq!(FieldPath::property("Email").unwrap(), FieldPath::from_field("Email"));
    assert_eq!(FieldPath::property("_id2").unwrap().to_string(), "_id2");
    assert!(FieldPath::property("").unwrap().is_root());

    for rejected in ["a.b", "Name.Length", "items[0]", "2fast", "len()", " Name"] {
        match FieldPath::property(rejected) {
            Err(ConfigError::InvalidPropertyPath(name)) => assert_eq!(name, rejected),
            other => panic!("expected rejection of {:?}, got {:?}", rejected, other),
        }
    }
}

#[test]
fn test_paths_identify_cascade_scopes() {
    let mut seen = HashSet::new();
    seen.insert(FieldPath::property("a").unwrap());
    seen.insert(FieldPath::property("b").unwrap());
    seen.insert(FieldPath::from_field("a"));

    assert_eq!(seen.len(), 2);
    assert!(!seen.contains(&FieldPath::root()));
}
