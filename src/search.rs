// src/search.rs
use crate::models::{Client, ClientStatus};

/// Case-insensitive substring match on name, email or phone.
pub fn matches_query(client: &Client, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [&client.name, &client.email, &client.phone]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn filter_clients<'a, I>(clients: I, query: &str, status: Option<ClientStatus>) -> Vec<&'a Client>
where
    I: IntoIterator<Item = &'a Client>,
{
    clients
        .into_iter()
        .filter(|client| status.map_or(true, |wanted| client.status == wanted))
        .filter(|client| matches_query(client, query))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub active: usize,
    pub expiring: usize,
    pub expired: usize,
}

impl StatusSummary {
    pub fn tally<'a, I>(clients: I) -> Self
    where
        I: IntoIterator<Item = &'a Client>,
    {
        clients.into_iter().fold(StatusSummary::default(), |mut summary, client| {
            match client.status {
                ClientStatus::Active => summary.active += 1,
                ClientStatus::Expiring => summary.expiring += 1,
                ClientStatus::Expired => summary.expired += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.active + self.expiring + self.expired
    }
}
