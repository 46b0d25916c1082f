use serde::de::DeserializeOwned;
use snafu::{Location, ResultExt, Snafu};
use surrealdb::engine::any::Any;
use surrealdb::opt::QueryResult;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DatabaseQueryError {
    #[snafu(display("failed to send the query at {location}: {source}"))]
    MalformedQuery {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("query statement failed at {location}: {source}"))]
    Statement {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// A SurrealQL query with its bound parameters. Parameters can be bound using the [Query::bind] method which takes any serializable data structure.
///
/// # Example
/// ```rust,ignore
/// let rated: Vec<Feedback> = database.sql("SELECT * FROM feedbacks WHERE rating >= $rating")
///     .bind(("rating", 9))
///     .fetch()
///     .await?;
/// ```
#[derive(Debug)]
pub struct Query<'a> {
    query: surrealdb::method::Query<'a, Any>,
}

impl<'a> Query<'a> {
    pub(crate) fn new(query: surrealdb::method::Query<'a, Any>) -> Self {
        Self { query }
    }

    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    /// Execute the query and deserialize the result of the first statement, either as `Option<T>` or `Vec<T>`.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<T, DatabaseQueryError>
    where
        usize: QueryResult<T>,
    {
        let mut response = self.query.await.context(MalformedQuerySnafu)?;
        let result = response.take::<T>(0).context(StatementSnafu)?;
        Ok(result)
    }

    /// Execute the query for its side effects, failing if any statement failed.
    pub async fn execute(self) -> Result<(), DatabaseQueryError> {
        let response = self.query.await.context(MalformedQuerySnafu)?;
        response.check().context(StatementSnafu)?;
        tracing::debug!("executed query");
        Ok(())
    }
}
