//! Row decoding against a live server. Set `DATABASE_URL` to run these;
//! without it every test returns early.

use chrono::FixedOffset;
use house_expense_api::database::rows::decode_row;
use house_expense_api::models::expense::ExpenseError;
use sqlx::{Connection, PgConnection};

async fn connect() -> Option<PgConnection> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(PgConnection::connect(&url).await.expect("DATABASE_URL should be reachable"))
}

fn plus_two_hours() -> FixedOffset {
    FixedOffset::east_opt(2 * 3600).unwrap()
}

#[tokio::test]
async fn driver_reported_types_become_json_values() {
    let Some(mut connection) = connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    sqlx::query("CREATE TYPE pg_temp.expense_kind AS ENUM ('food', 'rent')")
        .execute(&mut connection)
        .await
        .unwrap();

    let row = sqlx::query(
        "SELECT 1::int4 AS id,
                '2024-03-05'::date AS d,
                '2024-03-05 23:30:00'::timestamp AS ts,
                '2024-03-05 23:30:00+00'::timestamptz AS tz,
                NULL::int4 AS n,
                'food'::pg_temp.expense_kind AS kind,
                ARRAY['a', NULL]::text[] AS tags,
                ARRAY[1.50, 2]::numeric[] AS splits,
                42.50::numeric AS amount,
                '12.34'::money AS fee,
                '10.0.0.7'::inet AS host,
                '1 mon 2 days 01:00:00'::interval AS span",
    )
    .fetch_one(&mut connection)
    .await
    .unwrap();

    let decoded = decode_row(&row, plus_two_hours()).unwrap();

    assert_eq!(
        serde_json::to_string(&decoded).unwrap(),
        concat!(
            r#"{"id":1,"d":"2024-03-05","ts":"2024-03-05","tz":"2024-03-06","n":null,"#,
            r#""kind":"food","tags":["a",null],"splits":[1.50,2],"amount":42.50,"fee":12.34,"#,
            r#""host":"10.0.0.7","span":"P1M2DT3600S"}"#
        )
    );
}

#[tokio::test]
async fn undecodable_column_names_itself_in_the_error() {
    let Some(mut connection) = connect().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let row = sqlx::query("SELECT 1 AS id, '(1,2)'::point AS location")
        .fetch_one(&mut connection)
        .await
        .unwrap();

    match decode_row(&row, plus_two_hours()) {
        Err(ExpenseError::Backend(message)) => assert!(message.contains("location")),
        other => panic!("expected a backend error, got {other:?}"),
    }
}
