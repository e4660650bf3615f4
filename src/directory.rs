// src/directory.rs
use crate::models::{Client, ClientPatch, NewClient};
use chrono::{DateTime, Local, Utc};
use log;
use uuid::Uuid;

/// The in-memory client collection the admin works on.
#[derive(Debug, Default)]
pub struct ClientDirectory {
    clients: Vec<Client>,
}

impl ClientDirectory {
    pub fn new(clients: Vec<Client>) -> Self {
        ClientDirectory { clients }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|client| client.id == id)
    }

    /// Merges `patch` into the matching client. An unknown id is a no-op.
    pub fn update(&mut self, id: &str, patch: ClientPatch) {
        self.update_at(id, patch, Utc::now());
    }

    pub(crate) fn update_at(&mut self, id: &str, patch: ClientPatch, now: DateTime<Utc>) {
        log::info!("Updating client {}: {:?}", id, patch);
        match self.clients.iter_mut().find(|client| client.id == id) {
            Some(client) => client.apply_patch(patch, now),
            None => log::debug!("Update ignored: no client with id {}", id),
        }
    }

    /// Records `message` in the client's notes. There is no delivery channel.
    pub fn send_update_message(&mut self, id: &str, message: &str) {
        log::info!("Sending update message to client {}", id);
        let notes = format!("{} (Sent: {})", message, render_sent_timestamp(Local::now()));
        self.update(id, ClientPatch::notes(notes));
    }

    /// Appends a new client with a fresh id and returns that id.
    pub fn add_client(&mut self, fields: NewClient) -> String {
        self.add_client_at(fields, Utc::now())
    }

    pub(crate) fn add_client_at(&mut self, fields: NewClient, now: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        log::info!("Adding client {} ({})", fields.name, id);
        self.clients.push(Client::new(id.clone(), fields, now));
        id
    }
}

/// Local time in the month/day/year, 12-hour form used in note stamps,
/// e.g. `10/14/2026, 4:05:09 PM`.
pub fn render_sent_timestamp(at: DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
