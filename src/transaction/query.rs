//! Filtered database queries for listing transactions.

use rusqlite::{Connection, ToSql, params_from_iter};
use time::Date;

use crate::{Error, auth::UserId, category::CategoryId};

use super::core::{TimeOfDay, Transaction, map_transaction_row};

/// Criteria for narrowing down a user's transactions.
///
/// All set fields must match at once. An unset field matches everything, so
/// the default filter returns the user's full history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions with this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions on or after this date.
    pub date_from: Option<Date>,
    /// Only include transactions on or before this date.
    pub date_to: Option<Date>,
    /// Only include transactions at or after this time of day.
    pub time_from: Option<TimeOfDay>,
    /// Only include transactions at or before this time of day.
    pub time_to: Option<TimeOfDay>,
    /// Only include transactions whose description contains this text.
    pub search: Option<String>,
}

/// A single page of transactions along with the page count for the full
/// result set.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPage {
    /// The transactions on the requested page.
    pub transactions: Vec<Transaction>,
    /// How many pages the filtered result set spans.
    pub page_count: u64,
}

/// Build the WHERE clause and parameters for `filter` scoped to `user_id`.
fn filter_conditions(
    user_id: &UserId,
    filter: &TransactionFilter,
) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions = vec!["user_transaction.user_id = ?1".to_owned()];
    let mut parameters: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_str().to_owned())];

    if let Some(category_id) = &filter.category_id {
        parameters.push(Box::new(category_id.as_ref().to_owned()));
        conditions.push(format!("category_id = ?{}", parameters.len()));
    }

    if let Some(date_from) = filter.date_from {
        parameters.push(Box::new(date_from));
        conditions.push(format!("date >= ?{}", parameters.len()));
    }

    if let Some(date_to) = filter.date_to {
        parameters.push(Box::new(date_to));
        conditions.push(format!("date <= ?{}", parameters.len()));
    }

    if let Some(time_from) = &filter.time_from {
        parameters.push(Box::new(time_from.as_ref().to_owned()));
        conditions.push(format!("time >= ?{}", parameters.len()));
    }

    if let Some(time_to) = &filter.time_to {
        parameters.push(Box::new(time_to.as_ref().to_owned()));
        conditions.push(format!("time <= ?{}", parameters.len()));
    }

    if let Some(search) = &filter.search {
        parameters.push(Box::new(format!("%{search}%")));
        conditions.push(format!("description LIKE ?{}", parameters.len()));
    }

    (conditions.join(" AND "), parameters)
}

/// Get all of `user_id`'s transactions matching `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transactions(
    user_id: &UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, parameters) = filter_conditions(user_id, filter);

    // Sort by date and time, then ID to keep transaction order stable after
    // updates.
    let query = format!(
        "SELECT \"transaction\".id, date, time, category_id, description, amount, is_expense \
        FROM \"transaction\" \
        INNER JOIN user_transaction ON user_transaction.transaction_id = \"transaction\".id \
        WHERE {where_clause} \
        ORDER BY date DESC, time DESC, \"transaction\".id ASC"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

/// Get one page of `user_id`'s transactions matching `filter`, newest first.
///
/// `page_number` starts at 1. A page number past the end of the result set
/// yields an empty page rather than an error.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_transaction_page(
    user_id: &UserId,
    filter: &TransactionFilter,
    page_number: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<TransactionPage, Error> {
    let (where_clause, parameters) = filter_conditions(user_id, filter);

    let count_query = format!(
        "SELECT COUNT(1) \
        FROM \"transaction\" \
        INNER JOIN user_transaction ON user_transaction.transaction_id = \"transaction\".id \
        WHERE {where_clause}"
    );
    let transaction_count: i64 = connection
        .prepare(&count_query)?
        .query_row(params_from_iter(parameters.iter()), |row| row.get(0))?;
    let page_count = (transaction_count as u64).div_ceil(page_size);

    let offset = page_number.saturating_sub(1) * page_size;
    let page_query = format!(
        "SELECT \"transaction\".id, date, time, category_id, description, amount, is_expense \
        FROM \"transaction\" \
        INNER JOIN user_transaction ON user_transaction.transaction_id = \"transaction\".id \
        WHERE {where_clause} \
        ORDER BY date DESC, time DESC, \"transaction\".id ASC \
        LIMIT {page_size} OFFSET {offset}"
    );

    let transactions = connection
        .prepare(&page_query)?
        .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TransactionPage {
        transactions,
        page_count,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, User, UserId, create_user},
        category::{Category, CategoryId, CategoryName, create_category},
        db::initialize_db,
        transaction::{TimeOfDay, Transaction, create_transaction},
    };

    use super::{TransactionFilter, get_transaction_page, get_transactions};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        connection
    }

    fn create_test_user(id: &str, connection: &Connection) -> UserId {
        create_user(
            User {
                id: UserId::new(id),
                name: id.to_owned(),
                email: format!("{id}@example.com"),
                password_hash: PasswordHash::new_unchecked("hunter2"),
                budget: 1000.0,
                monthly_income: 2000.0,
            },
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    fn create_test_category(id: &str, name: &str, connection: &Connection) -> CategoryId {
        create_category(
            Category {
                id: CategoryId::new_unchecked(id),
                name: CategoryName::new_unchecked(name),
            },
            connection,
        )
        .expect("Could not create test category")
        .id
    }

    #[test]
    fn get_transactions_sorts_newest_first() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        let dates_and_times = [
            (date!(2025 - 10 - 04), "09:00"),
            (date!(2025 - 10 - 05), "18:00"),
            (date!(2025 - 10 - 05), "08:00"),
        ];
        for (date, time) in dates_and_times {
            create_transaction(
                Transaction::build(
                    1.0,
                    date,
                    TimeOfDay::new_unchecked(time),
                    category_id.clone(),
                    "",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }

        let transactions = get_transactions(&user_id, &TransactionFilter::default(), &connection)
            .expect("Could not query transactions");

        let got: Vec<(time::Date, String)> = transactions
            .iter()
            .map(|transaction| (transaction.date, transaction.time.to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                (date!(2025 - 10 - 05), "18:00".to_owned()),
                (date!(2025 - 10 - 05), "08:00".to_owned()),
                (date!(2025 - 10 - 04), "09:00".to_owned()),
            ]
        );
    }

    #[test]
    fn get_transactions_excludes_other_users() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        create_transaction(
            Transaction::build(
                1.0,
                date!(2025 - 10 - 05),
                TimeOfDay::new_unchecked("12:00"),
                category_id.clone(),
                "Alice's lunch",
            ),
            &alice,
            &connection,
        )
        .expect("Could not create transaction");
        create_transaction(
            Transaction::build(
                2.0,
                date!(2025 - 10 - 05),
                TimeOfDay::new_unchecked("12:00"),
                category_id,
                "Bob's lunch",
            ),
            &bob,
            &connection,
        )
        .expect("Could not create transaction");

        let transactions = get_transactions(&alice, &TransactionFilter::default(), &connection)
            .expect("Could not query transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].description, "Alice's lunch");
    }

    #[test]
    fn get_transactions_filters_by_category() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let groceries = create_test_category("0712", "Groceries", &connection);
        let transport = create_test_category("0305", "Transport", &connection);
        for category_id in [groceries.clone(), transport, groceries.clone()] {
            create_transaction(
                Transaction::build(
                    1.0,
                    date!(2025 - 10 - 05),
                    TimeOfDay::new_unchecked("12:00"),
                    category_id,
                    "",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }
        let filter = TransactionFilter {
            category_id: Some(groceries.clone()),
            ..Default::default()
        };

        let transactions = get_transactions(&user_id, &filter, &connection)
            .expect("Could not query transactions");

        assert_eq!(transactions.len(), 2);
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.category_id == groceries)
        );
    }

    #[test]
    fn get_transactions_filters_by_date_range() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        for day in 1..=5u8 {
            create_transaction(
                Transaction::build(
                    1.0,
                    date!(2025 - 10 - 01).replace_day(day).unwrap(),
                    TimeOfDay::new_unchecked("12:00"),
                    category_id.clone(),
                    "",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }
        let filter = TransactionFilter {
            date_from: Some(date!(2025 - 10 - 02)),
            date_to: Some(date!(2025 - 10 - 04)),
            ..Default::default()
        };

        let transactions = get_transactions(&user_id, &filter, &connection)
            .expect("Could not query transactions");

        let dates: Vec<time::Date> = transactions
            .iter()
            .map(|transaction| transaction.date)
            .collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 10 - 04),
                date!(2025 - 10 - 03),
                date!(2025 - 10 - 02),
            ]
        );
    }

    #[test]
    fn get_transactions_filters_by_time_range() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        for time in ["07:15", "12:30", "19:45"] {
            create_transaction(
                Transaction::build(
                    1.0,
                    date!(2025 - 10 - 05),
                    TimeOfDay::new_unchecked(time),
                    category_id.clone(),
                    "",
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }
        let filter = TransactionFilter {
            time_from: Some(TimeOfDay::new_unchecked("08:00")),
            time_to: Some(TimeOfDay::new_unchecked("18:00")),
            ..Default::default()
        };

        let transactions = get_transactions(&user_id, &filter, &connection)
            .expect("Could not query transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].time.to_string(), "12:30");
    }

    #[test]
    fn get_transactions_filters_by_search_text() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        for description in ["Weekly groceries", "Petrol", "More GROCERIES"] {
            create_transaction(
                Transaction::build(
                    1.0,
                    date!(2025 - 10 - 05),
                    TimeOfDay::new_unchecked("12:00"),
                    category_id.clone(),
                    description,
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }
        let filter = TransactionFilter {
            search: Some("groceries".to_owned()),
            ..Default::default()
        };

        let transactions = get_transactions(&user_id, &filter, &connection)
            .expect("Could not query transactions");

        // SQLite LIKE ignores ASCII case.
        assert_eq!(transactions.len(), 2);
    }

    #[test]
    fn get_transactions_combines_filters() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let groceries = create_test_category("0712", "Groceries", &connection);
        let transport = create_test_category("0305", "Transport", &connection);
        let rows = [
            (groceries.clone(), date!(2025 - 10 - 05), "Lunch"),
            (groceries.clone(), date!(2025 - 09 - 01), "Lunch"),
            (transport, date!(2025 - 10 - 05), "Lunch"),
            (groceries.clone(), date!(2025 - 10 - 05), "Petrol"),
        ];
        for (category_id, date, description) in rows {
            create_transaction(
                Transaction::build(
                    1.0,
                    date,
                    TimeOfDay::new_unchecked("12:00"),
                    category_id,
                    description,
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }
        let filter = TransactionFilter {
            category_id: Some(groceries),
            date_from: Some(date!(2025 - 10 - 01)),
            search: Some("Lunch".to_owned()),
            ..Default::default()
        };

        let transactions = get_transactions(&user_id, &filter, &connection)
            .expect("Could not query transactions");

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].date, date!(2025 - 10 - 05));
        assert_eq!(transactions[0].description, "Lunch");
    }

    #[test]
    fn get_transaction_page_splits_result_set() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        for i in 0..25 {
            create_transaction(
                Transaction::build(
                    1.0,
                    date!(2025 - 10 - 05),
                    TimeOfDay::new_unchecked("12:00"),
                    category_id.clone(),
                    &i.to_string(),
                ),
                &user_id,
                &connection,
            )
            .expect("Could not create transaction");
        }

        let page =
            get_transaction_page(&user_id, &TransactionFilter::default(), 3, 10, &connection)
                .expect("Could not query transactions");

        assert_eq!(page.page_count, 3);
        assert_eq!(page.transactions.len(), 5);
    }

    #[test]
    fn get_transaction_page_past_the_end_is_empty() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let category_id = create_test_category("0712", "Groceries", &connection);
        create_transaction(
            Transaction::build(
                1.0,
                date!(2025 - 10 - 05),
                TimeOfDay::new_unchecked("12:00"),
                category_id,
                "",
            ),
            &user_id,
            &connection,
        )
        .expect("Could not create transaction");

        let page =
            get_transaction_page(&user_id, &TransactionFilter::default(), 4, 10, &connection)
                .expect("Could not query transactions");

        assert_eq!(page.page_count, 1);
        assert!(page.transactions.is_empty());
    }
}
