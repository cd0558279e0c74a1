//! Demo dataset.
//!
//! Kept in step with `migrations/0002_seed.sql` so the in-memory store and a
//! freshly migrated Postgres database hold the same rows (same ids too).

use serde_json::{json, Value};

use crate::models::{Row, Table};

fn into_row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Every seed row, tagged with its table.
pub fn rows() -> Vec<(Table, Row)> {
    let products = [
        json!({ "id": "8a383dcb-3278-4e9b-8af5-ae8f5beb3e27", "name": "Webcam HD", "price": 59.9, "rating": 3.9, "stock_quantity": 80 }),
        json!({ "id": "e5c42436-0674-49e5-8ef5-347656d973ae", "name": "Wireless Mouse", "price": 24.99, "rating": 4.5, "stock_quantity": 500 }),
        json!({ "id": "634aec94-b8dd-431a-8bd8-60d5ac7d70d3", "name": "Ergonomic Chair", "price": 349, "rating": 4.6, "stock_quantity": 50 }),
        json!({ "id": "842503df-0eb9-43e5-bb38-cf46b7bb142a", "name": "USB-C Hub", "price": 39, "rating": 4.1, "stock_quantity": 150 }),
        json!({ "id": "4973ae65-c133-4586-ae0e-3a1c49e3bfcd", "name": "Mechanical Keyboard", "price": 89.5, "rating": 4.7, "stock_quantity": 200 }),
        json!({ "id": "12004dfd-2aa9-4fb1-b081-268fdb813973", "name": "Desk Lamp", "price": 32, "rating": null, "stock_quantity": 75 }),
        json!({ "id": "9a580777-3cbf-4a65-9c02-09f858878f1e", "name": "Laptop Stand", "price": 45.75, "rating": 4.3, "stock_quantity": 120 }),
        json!({ "id": "bda701ac-24aa-434f-b3bc-116de0ab611b", "name": "Noise Cancelling Headphones", "price": 199.99, "rating": 4.8, "stock_quantity": 100 }),
    ];

    let users = [
        json!({ "id": "b2053fac-1a8d-4a76-ae0c-6d045048f8d2", "name": "Alice Johnson", "email": "alice@example.com" }),
        json!({ "id": "07707fb0-d10b-469c-90ce-2ea28e1c46a3", "name": "Bob Smith", "email": "bob@example.com" }),
        json!({ "id": "12734a76-7ac9-4cd4-9ea2-185334cd446c", "name": "Carol Diaz", "email": "carol@example.com" }),
    ];

    let sales = [
        json!({ "id": "62a4e6fd-c9f2-4352-af17-9338165a619b", "total_value": 128900.25, "change_percentage": -2.6, "date": "2024-03-01T00:00:00Z" }),
        json!({ "id": "b45f6d7a-ec1f-42df-ae58-f9ce17f533ac", "total_value": 125000.5, "change_percentage": 12.5, "date": "2024-01-01T00:00:00Z" }),
        json!({ "id": "92ed9a21-df55-4d08-9b4c-32efbcb7fbac", "total_value": 141250, "change_percentage": null, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "6a8a2b65-f0da-47bc-bfeb-a8e79616a9a2", "total_value": 132400, "change_percentage": 5.9, "date": "2024-02-01T00:00:00Z" }),
    ];

    let purchases = [
        json!({ "id": "dc7420d1-7cea-4226-babc-80a12125e04d", "total_purchased": 90250, "change_percentage": 18, "date": "2024-03-01T00:00:00Z" }),
        json!({ "id": "f8760687-16dc-41fd-8ae3-5bd2a15ec509", "total_purchased": 80000, "change_percentage": 8.1, "date": "2024-01-01T00:00:00Z" }),
        json!({ "id": "33dcc239-b6bb-42a1-8701-e7335f07f1b6", "total_purchased": 88000, "change_percentage": null, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "7d060c81-b11f-491d-b4ab-14af250729a3", "total_purchased": 76500.75, "change_percentage": -4.4, "date": "2024-02-01T00:00:00Z" }),
    ];

    let expenses = [
        json!({ "id": "2f351d38-bbf6-416c-84e4-8d70837fdd5a", "total_expenses": 49100.25, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "53cc8482-61ba-4791-8b18-ff87b7e5bd28", "total_expenses": 45000, "date": "2024-01-01T00:00:00Z" }),
        json!({ "id": "c9f4241d-826c-44ac-ab64-f03593d0f961", "total_expenses": 43900, "date": "2024-03-01T00:00:00Z" }),
        json!({ "id": "02d1f002-e6ea-47c2-b843-c145cd1e56d9", "total_expenses": 47250.5, "date": "2024-02-01T00:00:00Z" }),
    ];

    let by_category = [
        json!({ "id": "c0d24873-e7ab-449e-b3e4-1c3a28d8ba4b", "category": "Office", "amount": 4500.75, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "3ba7e558-445e-4e97-a7b2-7db711a08aad", "category": "Salaries", "amount": 32000, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "87029da2-ca44-4aad-b69e-2f88021bde09", "category": "Utilities", "amount": 2100, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "0368c9ca-d83b-4747-ac52-52a10e7cd98f", "category": "Marketing", "amount": 8200.5, "date": "2024-04-01T00:00:00Z" }),
        json!({ "id": "5828dd19-c3a2-4775-9b9b-045e59ea444f", "category": "Travel", "amount": 2299, "date": "2024-04-01T00:00:00Z" }),
    ];

    let tagged = |table: Table, values: Vec<Value>| {
        values.into_iter().map(move |v| (table, into_row(v)))
    };

    tagged(Table::Products, products.to_vec())
        .chain(tagged(Table::Users, users.to_vec()))
        .chain(tagged(Table::SalesSummary, sales.to_vec()))
        .chain(tagged(Table::PurchaseSummary, purchases.to_vec()))
        .chain(tagged(Table::ExpenseSummary, expenses.to_vec()))
        .chain(tagged(Table::ExpenseByCategory, by_category.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_seed_row_uses_whitelisted_columns() {
        for (table, row) in rows() {
            for column in row.keys() {
                assert!(table.has_column(column), "{table}.{column}");
            }
            for column in table.required_columns() {
                assert!(row.contains_key(*column), "{table} seed row missing {column}");
            }
        }
    }

    #[test]
    fn product_stock_levels_match_demo_dataset() {
        let mut stocks: Vec<i64> = rows()
            .into_iter()
            .filter(|(t, _)| *t == Table::Products)
            .filter_map(|(_, r)| r["stock_quantity"].as_i64())
            .collect();
        stocks.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(stocks, vec![500, 200, 150, 120, 100, 80, 75, 50]);
    }
}
