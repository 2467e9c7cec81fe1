use super::{ExpenseSource, rows::decode_row};
use crate::config::{DatabaseSettings, ResultMode};
use crate::models::expense::{ArgValue, ExpenseError, ExpenseQuery};
use crate::models::row::ExpenseRow;
use chrono::FixedOffset;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgConnection, PgRow};
use sqlx::query::Query;
use sqlx::{Connection, Postgres};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// PostgreSQL-backed expense source. Opens one connection per fetch.
#[derive(Debug, Clone)]
pub struct Database {
    options: PgConnectOptions,
    connect_timeout: Duration,
    result_mode: ResultMode,
}

impl Database {
    pub fn new(settings: &DatabaseSettings) -> Result<Self, sqlx::Error> {
        let options = match &settings.url {
            Some(url) => url.parse::<PgConnectOptions>()?,
            None => PgConnectOptions::new()
                .host(&settings.host)
                .port(settings.port)
                .database(&settings.name)
                .username(&settings.user)
                .password(&settings.password),
        };

        Ok(Self {
            options: options.application_name(env!("CARGO_PKG_NAME")),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            result_mode: settings.result_mode,
        })
    }

    async fn connect(&self) -> Result<PgConnection, ExpenseError> {
        match timeout(self.connect_timeout, PgConnection::connect_with(&self.options)).await {
            Ok(connection) => Ok(connection?),
            Err(_) => Err(ExpenseError::Backend(format!(
                "Timed out after {}s connecting to database",
                self.connect_timeout.as_secs()
            ))),
        }
    }
}

fn bind_arguments<'q>(
    mut statement: Query<'q, Postgres, PgArguments>,
    query: &ExpenseQuery,
) -> Query<'q, Postgres, PgArguments> {
    for argument in query.arguments() {
        statement = match argument.value {
            ArgValue::Int(value) => statement.bind(value),
            ArgValue::Float(value) => statement.bind(value),
            ArgValue::Text(value) => statement.bind(value),
        };
    }
    statement
}

/// UTC offset of the session's `TimeZone` setting, used to date `TIMESTAMPTZ` values.
async fn session_offset(connection: &mut PgConnection) -> Result<FixedOffset, ExpenseError> {
    let seconds: i32 = sqlx::query_scalar("SELECT EXTRACT(TIMEZONE FROM now())::integer")
        .fetch_one(&mut *connection)
        .await?;

    FixedOffset::east_opt(seconds)
        .ok_or_else(|| ExpenseError::Backend(format!("Invalid session UTC offset: {}s", seconds)))
}

async fn run_procedure(
    connection: &mut PgConnection,
    query: &ExpenseQuery,
    mode: ResultMode,
) -> Result<Vec<PgRow>, sqlx::Error> {
    match mode {
        ResultMode::TempTable => {
            let call = query.call_statement();
            bind_arguments(sqlx::query(&call), query)
                .execute(&mut *connection)
                .await?;

            let select = query.select_temp_table_statement();
            sqlx::query(&select).fetch_all(&mut *connection).await
        }
        ResultMode::Function => {
            let select = query.select_function_statement();
            bind_arguments(sqlx::query(&select), query)
                .fetch_all(&mut *connection)
                .await
        }
    }
}

impl ExpenseSource for Database {
    async fn fetch_expenses(&self, query: &ExpenseQuery) -> Result<Vec<ExpenseRow>, ExpenseError> {
        let mut connection = self.connect().await?;

        let result = async {
            let offset = session_offset(&mut connection).await?;
            let rows = run_procedure(&mut connection, query, self.result_mode).await?;
            Ok::<_, ExpenseError>((offset, rows))
        }
        .await;

        if let Err(e) = connection.close().await {
            warn!("Failed to close database connection: {}", e);
        }

        let (offset, rows) = result?;
        debug!("{} returned {} rows", query.procedure(), rows.len());

        rows.iter().map(|row| decode_row(row, offset)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        let settings = DatabaseSettings {
            url: Some("not a url".to_string()),
            ..DatabaseSettings::default()
        };

        assert!(Database::new(&settings).is_err());
    }

    #[test]
    fn carries_timeout_and_mode_from_settings() {
        let settings = DatabaseSettings {
            connect_timeout_secs: 3,
            result_mode: ResultMode::Function,
            ..DatabaseSettings::default()
        };

        let database = Database::new(&settings).unwrap();

        assert_eq!(database.connect_timeout, Duration::from_secs(3));
        assert_eq!(database.result_mode, ResultMode::Function);
    }

    #[tokio::test]
    async fn session_offset_follows_time_zone_setting() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            return;
        };
        let mut connection = PgConnection::connect(&url).await.unwrap();
        sqlx::query("SET TIME ZONE 'Asia/Kolkata'")
            .execute(&mut connection)
            .await
            .unwrap();

        let offset = session_offset(&mut connection).await.unwrap();

        assert_eq!(offset.local_minus_utc(), 5 * 3600 + 30 * 60);
    }
}
