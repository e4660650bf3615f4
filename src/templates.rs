// src/templates.rs

/// Canned messages offered on the client detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTemplate {
    RenewalReminder,
    PaymentConfirmation,
    ExpirationWarning,
}

impl MessageTemplate {
    pub const ALL: [MessageTemplate; 3] = [
        MessageTemplate::RenewalReminder,
        MessageTemplate::PaymentConfirmation,
        MessageTemplate::ExpirationWarning,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MessageTemplate::RenewalReminder => "Renewal Reminder",
            MessageTemplate::PaymentConfirmation => "Payment Confirmation",
            MessageTemplate::ExpirationWarning => "Expiration Warning",
        }
    }

    /// `days` is the raw days input as currently typed, not the stored count.
    pub fn render(&self, client_name: &str, days: &str) -> String {
        match self {
            MessageTemplate::RenewalReminder => format!(
                "Hi {}, your WiFi subscription has {} days remaining. Please renew soon to avoid service interruption.",
                client_name, days
            ),
            MessageTemplate::PaymentConfirmation => format!(
                "Hi {}, your WiFi subscription has been successfully renewed. Thank you for your payment!",
                client_name
            ),
            MessageTemplate::ExpirationWarning => format!(
                "Hi {}, your WiFi subscription is expiring soon. Contact us to renew your service.",
                client_name
            ),
        }
    }
}
