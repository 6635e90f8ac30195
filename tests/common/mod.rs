//! Demo model shared by the integration tests.
#![allow(dead_code)]

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use sift::prelude::*;

pub const GENDERS: &[EnumMember] = &[
    EnumMember::new("Male", 0),
    EnumMember::new("Female", 1),
    EnumMember::new("Diverse", 2),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male = 0,
    Female = 1,
    Diverse = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub name: String,
    pub code: String,
}

impl Entity for Country {
    fn model() -> &'static Model {
        static MODEL: OnceLock<Model> = OnceLock::new();
        MODEL.get_or_init(|| {
            Model::builder("Country")
                .field("Name", FieldKind::String)
                .field("Code", FieldKind::String)
                .build()
        })
    }

    fn get(&self, field: &str) -> Value<'_> {
        match field {
            "Name" => Value::from(&self.name),
            "Code" => Value::from(&self.code),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub country: Option<Country>,
}

impl Entity for Address {
    fn model() -> &'static Model {
        static MODEL: OnceLock<Model> = OnceLock::new();
        MODEL.get_or_init(|| {
            Model::builder("Address")
                .field("Street", FieldKind::String)
                .field("City", FieldKind::String)
                .field("Country", FieldKind::Navigation(Country::model))
                .nullable()
                .build()
        })
    }

    fn get(&self, field: &str) -> Value<'_> {
        match field {
            "Street" => Value::from(&self.street),
            "City" => Value::from(&self.city),
            "Country" => Value::optional_object(self.country.as_ref()),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub title: String,
    pub budget: i64,
}

impl Entity for Project {
    fn model() -> &'static Model {
        static MODEL: OnceLock<Model> = OnceLock::new();
        MODEL.get_or_init(|| {
            Model::builder("Project")
                .field("Title", FieldKind::String)
                .field("Budget", FieldKind::Int)
                .build()
        })
    }

    fn get(&self, field: &str) -> Value<'_> {
        match field {
            "Title" => Value::from(&self.title),
            "Budget" => Value::from(self.budget),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<Gender>,
    pub birthday: Option<NaiveDateTime>,
    pub is_active: bool,
    pub salary: f64,
    pub address: Option<Address>,
    pub projects: Vec<Project>,
}

impl Entity for Person {
    fn model() -> &'static Model {
        static MODEL: OnceLock<Model> = OnceLock::new();
        MODEL.get_or_init(|| {
            Model::builder("Person")
                .field("Id", FieldKind::Int)
                .field("FirstName", FieldKind::String)
                .field("LastName", FieldKind::String)
                .field("Gender", FieldKind::Enum(GENDERS))
                .nullable()
                .field("Birthday", FieldKind::DateTime)
                .nullable()
                .field("IsActive", FieldKind::Bool)
                .field("Salary", FieldKind::Float)
                .field("Address", FieldKind::Navigation(Address::model))
                .nullable()
                .field("Projects", FieldKind::Collection(Project::model))
                .build()
        })
    }

    fn get(&self, field: &str) -> Value<'_> {
        match field {
            "Id" => Value::from(self.id),
            "FirstName" => Value::from(&self.first_name),
            "LastName" => Value::from(&self.last_name),
            "Gender" => Value::from(self.gender.map(|g| g as i64)),
            "Birthday" => Value::from(self.birthday),
            "IsActive" => Value::from(self.is_active),
            "Salary" => Value::from(self.salary),
            "Address" => Value::optional_object(self.address.as_ref()),
            "Projects" => Value::list(&self.projects),
            _ => Value::Null,
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Fixed instant used as "now" by relative date tests.
pub fn now() -> NaiveDateTime {
    date(2024, 6, 1)
}

fn person(id: i64, first: &str, last: &str) -> Person {
    Person {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        gender: None,
        birthday: None,
        is_active: true,
        salary: 0.0,
        address: None,
        projects: Vec::new(),
    }
}

fn address(street: &str, city: &str, country: Option<(&str, &str)>) -> Option<Address> {
    Some(Address {
        street: street.to_string(),
        city: city.to_string(),
        country: country.map(|(name, code)| Country {
            name: name.to_string(),
            code: code.to_string(),
        }),
    })
}

fn projects(items: &[(&str, i64)]) -> Vec<Project> {
    items
        .iter()
        .map(|(title, budget)| Project {
            title: title.to_string(),
            budget: *budget,
        })
        .collect()
}

/// Six people with a mix of null and non-null values.
///
/// Person 2 has an address without a country; persons 3 and 5 have no address.
pub fn people() -> Vec<Person> {
    vec![
        Person {
            gender: Some(Gender::Male),
            birthday: Some(date(1970, 5, 12)),
            salary: 5200.0,
            address: address("Main Street 1", "Berlin", Some(("Germany", "DE"))),
            projects: projects(&[("Website", 12000), ("Shop", 30000)]),
            ..person(1, "Joe", "Smith")
        },
        Person {
            gender: Some(Gender::Female),
            birthday: Some(date(1990, 1, 30)),
            is_active: false,
            salary: 6100.5,
            address: address("Elm Road 4", "Hamburg", None),
            ..person(2, "Eve", "Smith")
        },
        Person {
            gender: Some(Gender::Diverse),
            birthday: Some(date(1984, 5, 31)),
            salary: 4300.0,
            projects: projects(&[("Website relaunch", 8000)]),
            ..person(3, "Sam", "Jones")
        },
        Person {
            salary: 3900.0,
            address: address("Baker Street 221b", "London", Some(("United Kingdom", "GB"))),
            ..person(4, "Ann", "Brown")
        },
        Person {
            gender: Some(Gender::Male),
            birthday: Some(date(2001, 11, 3)),
            is_active: false,
            salary: 2500.0,
            projects: projects(&[("App", 15000)]),
            ..person(5, "Bob", "Jones")
        },
        Person {
            gender: Some(Gender::Female),
            birthday: Some(date(1962, 2, 14)),
            salary: 7000.0,
            address: address("Abbey Road 3", "London", Some(("United Kingdom", "GB"))),
            ..person(6, "Zoe", "Adams")
        },
    ]
}

pub fn ids<'a>(items: impl IntoIterator<Item = &'a Person>) -> Vec<i64> {
    items.into_iter().map(|p| p.id).collect()
}
