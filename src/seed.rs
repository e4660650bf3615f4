// src/seed.rs
use crate::models::{Client, NewClient};
use chrono::{DateTime, Duration, Utc};

// (id, name, email, phone, days, notes, hours since last update)
const DEMO_CLIENTS: &[(&str, &str, &str, &str, i64, &str, i64)] = &[
    ("1", "John Smith", "john.smith@email.com", "+1 555-0101", 25, "Premium plan, pays monthly", 48),
    ("2", "Sarah Johnson", "sarah.j@email.com", "+1 555-0102", 5, "Asked about upgrading speed", 24),
    ("3", "Michael Brown", "m.brown@email.com", "+1 555-0103", 0, "Payment overdue", 120),
    ("4", "Emily Davis", "emily.davis@email.com", "+1 555-0104", 45, "Annual subscriber", 72),
    ("5", "David Wilson", "d.wilson@email.com", "+1 555-0105", 2, "Reminder sent last week", 6),
    ("6", "Lisa Anderson", "lisa.a@email.com", "+1 555-0106", 60, "Business account", 200),
];

/// The mock dataset the app starts with, stamped relative to `now`.
pub fn demo_clients(now: DateTime<Utc>) -> Vec<Client> {
    DEMO_CLIENTS
        .iter()
        .map(|&(id, name, email, phone, days, notes, hours_ago)| {
            let mut client = Client::new(
                id.to_string(),
                NewClient {
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    subscription_days: days,
                    notes: notes.to_string(),
                },
                now,
            );
            client.last_update = now - Duration::hours(hours_ago);
            client
        })
        .collect()
}
