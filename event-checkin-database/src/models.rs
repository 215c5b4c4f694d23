use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};
use serde::{Deserialize, Serialize};

use crate::schema::{companies, events, participation, persons};

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = persons)]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub company_id: String,
    pub card_id: String,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: String,
    pub name: String,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = participation)]
pub struct Participation {
    pub person_id: String,
    pub event_id: String,
}

/// A person checked in to an event, with the name of their company.
#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    #[diesel(sql_type = Text)]
    pub person_id: String,
    #[diesel(sql_type = Text)]
    pub first_name: String,
    #[diesel(sql_type = Text)]
    pub last_name: String,
    #[diesel(sql_type = Text)]
    pub company: String,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompanyAttendance {
    #[diesel(sql_type = Text)]
    pub company_id: String,
    #[diesel(sql_type = Text)]
    pub company_name: String,
    #[diesel(sql_type = BigInt)]
    pub attendee_count: i64,
}

#[derive(QueryableByName, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendeeCount {
    #[diesel(sql_type = BigInt)]
    pub attendee_count: i64,
}

/// Number of rows a write touched.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledgment {
    pub rows_affected: usize,
}

// Every payload field is optional: a missing field is an invalid request,
// not a deserialization failure.

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<String>,
    pub card_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct NewParticipation {
    pub person_id: Option<String>,
    pub event_id: Option<String>,
}
