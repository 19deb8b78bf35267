//! The demo queries.

use crate::user::User;
use miniorm_core::{field, record, DbContext, Error, Result, Value};

/// The result of one demo query, ready for formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

impl Section {
    fn new(title: &'static str, columns: &[&'static str]) -> Self {
        Self {
            title,
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn users(title: &'static str, users: impl IntoIterator<Item = User>) -> Self {
        let mut section = Self::new(title, &["id", "name", "age"]);
        section.rows = users
            .into_iter()
            .map(|u| vec![u.id.into(), u.name.into(), u.age.into()])
            .collect();
        section
    }
}

/// Run every demo query against `ctx`.
pub fn run(ctx: &DbContext) -> Result<Vec<Section>> {
    let users = ctx.set::<User>();
    let mut sections = Vec::with_capacity(6);

    let starts_with_a = users.filter(field("name").starts_with("A")).collect()?;
    sections.push(Section::users("Users whose name starts with 'A'", starts_with_a));

    let contains_li: Vec<(i32, String)> = users
        .filter(field("name").contains("li"))
        .project(record([("id", field("id")), ("name", field("name"))]))
        .limit(1)
        .collect()?;
    let mut section = Section::new("Users with 'li' in their name (limit 1)", &["id", "name"]);
    section.rows = contains_li
        .into_iter()
        .map(|(id, name)| vec![id.into(), name.into()])
        .collect();
    sections.push(section);

    let adults = users.filter(field("age").gt(18)).collect()?;
    sections.push(Section::users("Adult users (age > 18)", adults));

    let name_and_age: Vec<(String, i32)> = users
        .filter(field("age").ge(20))
        .project(record([("name", field("name")), ("age", field("age"))]))
        .collect()?;
    let mut section = Section::new("Name and age of users aged 20 or more", &["name", "age"]);
    section.rows = name_and_age
        .into_iter()
        .map(|(name, age)| vec![name.into(), age.into()])
        .collect();
    sections.push(section);

    let first_adult = match users.filter(field("age").ge(18)).first() {
        Ok(user) => Some(user),
        Err(Error::NoRows { .. }) => None,
        Err(e) => return Err(e),
    };
    sections.push(Section::users("First adult user", first_adult));

    let all = users.collect()?;
    sections.push(Section::users("All users", all));

    Ok(sections)
}
