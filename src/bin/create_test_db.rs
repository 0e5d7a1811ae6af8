use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use depensier_rs::{
    Category, CategoryId, CategoryName, PasswordHash, Revenue, RevenueType, TimeOfDay, Transaction,
    User, UserId, ValidatedPassword, create_category, create_revenue, create_transaction,
    create_user, initialize_db,
};

/// Create a database with a demo user, categories, transactions and revenue
/// for trying out the app locally.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to write the new SQLite database file.
    #[arg(long, short)]
    output_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    if output_path
        .extension()
        .is_none_or(|extension| extension.is_empty())
    {
        eprintln!("Output path must include a file extension (e.g., 'demo.db').");
        exit(1);
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let connection = Connection::open(output_path)?;

    initialize_db(&connection)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        User {
            id: UserId::new("demo"),
            name: "Demo User".to_owned(),
            email: "demo@example.com".to_owned(),
            password_hash,
            budget: 1200.0,
            monthly_income: 3600.0,
        },
        &connection,
    )?;

    println!("Creating demo categories...");

    let mut categories = Vec::new();
    for (id, name) in [
        ("0101", "Rent"),
        ("0205", "Transport"),
        ("0309", "Dining Out"),
        ("0712", "Groceries"),
    ] {
        let category = create_category(
            Category {
                id: CategoryId::new(id)?,
                name: CategoryName::new(name)?,
            },
            &connection,
        )?;
        categories.push(category.id);
    }

    println!("Creating demo transactions...");

    let today = OffsetDateTime::now_utc().date();
    let transactions = [
        (0, "09:10", 3, "Weekly shop", 54.50, true),
        (1, "08:05", 1, "Bus fare", 3.20, true),
        (1, "12:45", 2, "Lunch with friends", 23.90, true),
        (2, "11:00", 3, "Bottle refund", 12.40, false),
        (3, "17:30", 3, "Top-up shop", 18.75, true),
        (5, "10:00", 0, "Monthly rent", 450.00, true),
    ];
    for (days_ago, time, category_index, description, amount, is_expense) in transactions {
        create_transaction(
            Transaction::build(
                amount,
                today - Duration::days(days_ago),
                TimeOfDay::new(time)?,
                categories[category_index].clone(),
                description,
            )
            .is_expense(is_expense),
            &user.id,
            &connection,
        )?;
    }

    println!("Creating demo revenue...");

    let revenue = [
        (6, RevenueType::Salary, "Monthly salary", 3600.00),
        (10, RevenueType::Freelance, "Website gig", 250.00),
    ];
    for (days_ago, revenue_type, description, amount) in revenue {
        create_revenue(
            Revenue::build(
                amount,
                today - Duration::days(days_ago),
                revenue_type,
                description,
            ),
            &user.id,
            &connection,
        )?;
    }

    println!("Success!");

    Ok(())
}
