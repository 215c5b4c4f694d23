//! The check-in data access layer.
//!
//! Every operation validates its input before building a statement, so a
//! request with a missing id never reaches storage. Lookups by id tell apart a
//! missing id ([`CheckinError::InvalidRequest`]) from a missing row
//! ([`CheckinError::NotFound`]).

use tracing::warn;

use crate::error::{CheckinError, QueryError};
use crate::executor::{QueryExecutor, Row};
use crate::models::{
    Acknowledgment, AttendeeCount, Company, CompanyAttendance, Event, NewParticipation, NewPerson,
    Participant, Participation, Person, PersonUpdate,
};
use crate::statement::Statement;

const FETCH_PERSON_BY_ID: &str =
    "SELECT id, first_name, last_name, company_id, card_id FROM persons WHERE id = $1";

const FETCH_PERSON_BY_CARD_ID: &str =
    "SELECT id, first_name, last_name, company_id, card_id FROM persons WHERE card_id = $1";

const UPDATE_PERSON_BY_ID: &str =
    "UPDATE persons SET first_name = $1, last_name = $2, company_id = $3 WHERE id = $4";

const CREATE_PERSON: &str =
    "INSERT INTO persons (first_name, last_name, company_id, card_id) VALUES ($1, $2, $3, $4)";

const FETCH_PARTICIPATION: &str = "SELECT person_id, event_id FROM participation WHERE person_id \
                                   = $1 AND event_id = $2";

// the composite primary key turns a concurrent duplicate into zero affected rows
const ADD_PARTICIPATION: &str = "INSERT INTO participation (person_id, event_id) VALUES ($1, $2) \
                                 ON CONFLICT (person_id, event_id) DO NOTHING";

const FETCH_COMPANIES: &str = "SELECT id, name FROM companies ORDER BY name, id";

const FETCH_EVENTS: &str = "SELECT id, name, description FROM events ORDER BY name, id";

const FETCH_EVENT_BY_ID: &str = "SELECT id, name, description FROM events WHERE id = $1";

const FETCH_PARTICIPANTS_BY_EVENT_ID: &str = "SELECT persons.id AS person_id, \
                                              persons.first_name, persons.last_name, \
                                              companies.name AS company FROM persons INNER \
                                              JOIN participation ON persons.id = \
                                              participation.person_id INNER JOIN companies ON \
                                              persons.company_id = companies.id WHERE \
                                              participation.event_id = $1 ORDER BY \
                                              persons.last_name, persons.first_name, persons.id";

const FETCH_COMPANY_ATTENDANCE_COUNT_BY_EVENT_ID: &str =
    "SELECT c.id AS company_id, c.name AS company_name, COUNT(*) AS attendee_count FROM \
     companies AS c INNER JOIN persons AS p ON c.id = p.company_id INNER JOIN participation AS \
     part ON p.id = part.person_id WHERE part.event_id = $1 GROUP BY c.id, c.name ORDER BY \
     c.name, c.id";

const FETCH_TOTAL_ATTENDEE_COUNT_BY_EVENT_ID: &str =
    "SELECT COUNT(*) AS attendee_count FROM participation WHERE participation.event_id = $1";

/// Returns the value if it is present and not blank.
fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, CheckinError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CheckinError::InvalidRequest(format!("{field} is required")))
}

/// Maps constraint violations of a write onto request errors.
fn write_error(error: QueryError, dangling: &str) -> CheckinError {
    match error {
        QueryError::ForeignKeyViolation(_) => CheckinError::InvalidRequest(dangling.to_owned()),
        QueryError::UniqueViolation(message) => CheckinError::Conflict(message),
        other => CheckinError::Storage(other),
    }
}

pub struct Queries<E> {
    executor: E,
}

impl<E: QueryExecutor> Queries<E> {
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    async fn fetch_one<R: Row>(
        &self,
        statement: Statement,
        not_found: impl FnOnce() -> String,
    ) -> Result<R, CheckinError> {
        self.executor
            .query::<R>(&statement)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CheckinError::NotFound(not_found()))
    }

    pub async fn fetch_person_by_id(&self, id: Option<&str>) -> Result<Person, CheckinError> {
        let id = required("id", id)?;
        self.fetch_one(
            Statement::new("fetch-person-by-id", FETCH_PERSON_BY_ID).bind(id),
            || format!("no person with id {id}"),
        )
        .await
    }

    pub async fn fetch_person_by_card_id(
        &self,
        card_id: Option<&str>,
    ) -> Result<Person, CheckinError> {
        let card_id = required("card_id", card_id)?;
        self.fetch_one(
            Statement::new("fetch-person-by-card-id", FETCH_PERSON_BY_CARD_ID).bind(card_id),
            || format!("no person with card id {card_id}"),
        )
        .await
    }

    pub async fn update_person_by_id(
        &self,
        id: Option<&str>,
        update: &PersonUpdate,
    ) -> Result<Acknowledgment, CheckinError> {
        let id = required("id", id)?;
        let first_name = required("first_name", update.first_name.as_deref())?;
        let last_name = required("last_name", update.last_name.as_deref())?;
        let company_id = required("company_id", update.company_id.as_deref())?;

        let statement = Statement::new("update-person-by-id", UPDATE_PERSON_BY_ID)
            .bind(first_name)
            .bind(last_name)
            .bind(company_id)
            .bind(id);
        let rows_affected = self
            .executor
            .execute(&statement)
            .await
            .map_err(|err| write_error(err, &format!("no company with id {company_id}")))?;
        if rows_affected == 0 {
            return Err(CheckinError::NotFound(format!("no person with id {id}")));
        }
        Ok(Acknowledgment { rows_affected })
    }

    pub async fn create_person(&self, person: &NewPerson) -> Result<Acknowledgment, CheckinError> {
        let first_name = required("first_name", person.first_name.as_deref())?;
        let last_name = required("last_name", person.last_name.as_deref())?;
        let company_id = required("company_id", person.company_id.as_deref())?;
        let card_id = required("card_id", person.card_id.as_deref())?;

        let statement = Statement::new("create-person", CREATE_PERSON)
            .bind(first_name)
            .bind(last_name)
            .bind(company_id)
            .bind(card_id);
        let rows_affected = self
            .executor
            .execute(&statement)
            .await
            .map_err(|err| write_error(err, &format!("no company with id {company_id}")))?;
        Ok(Acknowledgment { rows_affected })
    }

    /// Absence of a participation is not an error.
    pub async fn fetch_participation(
        &self,
        person_id: &str,
        event_id: &str,
    ) -> Result<Option<Participation>, CheckinError> {
        let statement = Statement::new("fetch-participation-check", FETCH_PARTICIPATION)
            .bind(person_id)
            .bind(event_id);
        Ok(self
            .executor
            .query::<Participation>(&statement)
            .await?
            .into_iter()
            .next())
    }

    pub async fn add_participation(
        &self,
        participation: &NewParticipation,
    ) -> Result<Acknowledgment, CheckinError> {
        let person_id = required("person_id", participation.person_id.as_deref())?;
        let event_id = required("event_id", participation.event_id.as_deref())?;
        let conflict =
            || CheckinError::Conflict(format!("person {person_id} already attends event {event_id}"));

        if self
            .fetch_participation(person_id, event_id)
            .await?
            .is_some()
        {
            warn!(person_id, event_id, "duplicate participation");
            return Err(conflict());
        }

        let statement = Statement::new("add-participation", ADD_PARTICIPATION)
            .bind(person_id)
            .bind(event_id);
        let rows_affected = match self.executor.execute(&statement).await {
            Ok(rows_affected) => rows_affected,
            Err(QueryError::UniqueViolation(_)) => 0,
            Err(err) => {
                return Err(write_error(
                    err,
                    &format!("no person {person_id} or no event {event_id}"),
                ))
            }
        };
        if rows_affected == 0 {
            warn!(person_id, event_id, "participation was added concurrently");
            return Err(conflict());
        }
        Ok(Acknowledgment { rows_affected })
    }

    pub async fn fetch_companies(&self) -> Result<Vec<Company>, CheckinError> {
        Ok(self
            .executor
            .query(&Statement::new("fetch-companies", FETCH_COMPANIES))
            .await?)
    }

    pub async fn fetch_events(&self) -> Result<Vec<Event>, CheckinError> {
        Ok(self
            .executor
            .query(&Statement::new("fetch-events", FETCH_EVENTS))
            .await?)
    }

    pub async fn fetch_event_by_id(&self, id: Option<&str>) -> Result<Event, CheckinError> {
        let id = required("id", id)?;
        self.fetch_one(
            Statement::new("fetch-event-by-id", FETCH_EVENT_BY_ID).bind(id),
            || format!("no event with id {id}"),
        )
        .await
    }

    pub async fn fetch_participants_by_event_id(
        &self,
        event_id: Option<&str>,
    ) -> Result<Vec<Participant>, CheckinError> {
        let event_id = required("event_id", event_id)?;
        let statement = Statement::new(
            "fetch-event-participants-by-id",
            FETCH_PARTICIPANTS_BY_EVENT_ID,
        )
        .bind(event_id);
        Ok(self.executor.query(&statement).await?)
    }

    pub async fn fetch_company_attendance_count_by_event_id(
        &self,
        event_id: Option<&str>,
    ) -> Result<Vec<CompanyAttendance>, CheckinError> {
        let event_id = required("event_id", event_id)?;
        let statement = Statement::new(
            "fetch-attendance-count-by-event-id",
            FETCH_COMPANY_ATTENDANCE_COUNT_BY_EVENT_ID,
        )
        .bind(event_id);
        Ok(self.executor.query(&statement).await?)
    }

    pub async fn fetch_total_attendee_count_by_event_id(
        &self,
        event_id: Option<&str>,
    ) -> Result<AttendeeCount, CheckinError> {
        let event_id = required("event_id", event_id)?;
        let statement = Statement::new(
            "fetch-total-number-of-attendees-by-event-id",
            FETCH_TOTAL_ATTENDEE_COUNT_BY_EVENT_ID,
        )
        .bind(event_id);
        // COUNT(*) without GROUP BY always yields exactly one row
        Ok(self
            .executor
            .query::<AttendeeCount>(&statement)
            .await?
            .into_iter()
            .next()
            .unwrap_or(AttendeeCount { attendee_count: 0 }))
    }
}
