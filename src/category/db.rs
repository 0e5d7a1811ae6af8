//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// Add a category to the database.
///
/// # Errors
///
/// This function will return an [Error::DuplicateCategoryId] if a category
/// with the same ID already exists.
pub fn create_category(category: Category, connection: &Connection) -> Result<Category, Error> {
    let insert_result = connection.execute(
        "INSERT INTO category (id, name) VALUES (?1, ?2);",
        (category.id.as_ref(), category.name.as_ref()),
    );

    match insert_result {
        Ok(_) => Ok(category),
        // Code 1555 occurs when a primary key constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref description)))
            if sql_error.extended_code == 1555 && description.contains("category.id") =>
        {
            Err(Error::DuplicateCategoryId(category.id.to_string()))
        }
        Err(error) => Err(error.into()),
    }
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: &CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id.as_ref())], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories ordered by ID.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY id ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Update a category's name. Returns an error if the category doesn't exist.
pub fn update_category(
    category_id: &CategoryId,
    new_name: CategoryName,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1 WHERE id = ?2",
        (new_name.as_ref(), category_id.as_ref()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// # Errors
///
/// This function will return a:
/// - [Error::CategoryInUse] if any transaction still references the category,
/// - or [Error::DeleteMissingCategory] if the category doesn't exist.
pub fn delete_category(category_id: &CategoryId, connection: &Connection) -> Result<(), Error> {
    let transaction_count: i64 = connection
        .prepare("SELECT COUNT(1) FROM \"transaction\" WHERE category_id = :id;")?
        .query_row(&[(":id", &category_id.as_ref())], |row| row.get(0))?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1",
        [category_id.as_ref()],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_id: String = row.get(0)?;
    let raw_name: String = row.get(1)?;

    Ok(Category {
        id: CategoryId::new_unchecked(&raw_id),
        name: CategoryName::new_unchecked(&raw_name),
    })
}
