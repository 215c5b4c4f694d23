use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_types::Text;

/// A parameterized SQL statement. Input values only ever travel in `params`
/// and are referenced from `text` as `$1`, `$2`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: &'static str,
    pub text: &'static str,
    pub params: Vec<String>,
}

impl Statement {
    #[must_use]
    pub const fn new(name: &'static str, text: &'static str) -> Self {
        Self {
            name,
            text,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub(crate) fn to_sql_query(&self) -> BoxedSqlQuery<'static, Pg, SqlQuery> {
        self.params.iter().fold(
            diesel::sql_query(self.text).into_boxed::<Pg>(),
            |query, param| query.bind::<Text, _>(param.clone()),
        )
    }
}
