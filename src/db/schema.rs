//! SQL DDL and seed rows for the demo store.

/// Seed schema, applied once when the database file does not exist yet:
/// - `users` table (3 rows)
/// - `orders` table (3 rows, `customer_id` points at `users.id`)
pub const SQLITE_SEED: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT
);

CREATE TABLE orders (
    id INTEGER PRIMARY KEY,
    customer_id INTEGER,
    total REAL
);

INSERT INTO users (name) VALUES ('Anna'), ('Jan'), ('Ewa');

INSERT INTO orders (customer_id, total) VALUES (1, 100.0), (2, 50.0), (1, 75.0);
"#;

/// Tables exposed by the table editor, in display order.
pub const EDITABLE_TABLES: [&str; 2] = ["users", "orders"];
