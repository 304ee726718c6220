//! Transactional email: order confirmations and appointment notices.
//!
//! Uses SMTP via lettre for delivery with Askama text and HTML templates.
//! Callers treat every send as best-effort; a failure is logged by the
//! caller and never rolls back the order or booking it describes.

use askama::Template;
use chrono::{DateTime, FixedOffset, Utc};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::{Appointment, OrderWithItems};

const APPOINTMENT_TIME_FORMAT: &str = "%A %-d %B %Y at %H:%M";

/// One rendered order line.
struct LineView {
    name: String,
    quantity: i32,
    line_total: String,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    lines: &'a [LineView],
    subtotal: String,
    shipping: String,
    discount: Option<String>,
    total: String,
    pickup: bool,
    pickup_address: Option<&'a str>,
    shipping_address: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    order_number: &'a str,
    lines: &'a [LineView],
    subtotal: String,
    shipping: String,
    discount: Option<String>,
    total: String,
    pickup: bool,
    pickup_address: Option<&'a str>,
    shipping_address: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/appointment_confirmation.html")]
struct AppointmentConfirmationHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    service_name: &'a str,
    stylist_name: Option<&'a str>,
    when: &'a str,
}

#[derive(Template)]
#[template(path = "email/appointment_confirmation.txt")]
struct AppointmentConfirmationText<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    service_name: &'a str,
    stylist_name: Option<&'a str>,
    when: &'a str,
}

#[derive(Template)]
#[template(path = "email/appointment_reminder.html")]
struct AppointmentReminderHtml<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    service_name: &'a str,
    stylist_name: Option<&'a str>,
    when: &'a str,
}

#[derive(Template)]
#[template(path = "email/appointment_reminder.txt")]
struct AppointmentReminderText<'a> {
    store_name: &'a str,
    customer_name: &'a str,
    service_name: &'a str,
    stylist_name: Option<&'a str>,
    when: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Store details that appear in every message.
#[derive(Debug, Clone)]
pub struct Branding {
    pub store_name: String,
    pub currency_symbol: &'static str,
    pub pickup_address: Option<String>,
    pub utc_offset: FixedOffset,
}

impl Branding {
    fn money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, amount)
    }

    fn local_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.utc_offset)
            .format(APPOINTMENT_TIME_FORMAT)
            .to_string()
    }
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    branding: Branding,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, branding: Branding) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            branding,
        })
    }

    /// Send the order confirmation for a freshly placed order.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(&self, placed: &OrderWithItems) -> Result<(), EmailError> {
        let order = &placed.order;
        let lines: Vec<LineView> = placed
            .items
            .iter()
            .map(|item| LineView {
                name: item.variant.as_ref().map_or_else(
                    || item.product_name.clone(),
                    |variant| format!("{} ({variant})", item.product_name),
                ),
                quantity: item.quantity,
                line_total: self.branding.money(item.line_total),
            })
            .collect();
        let discount = (order.discount > Decimal::ZERO).then(|| self.branding.money(order.discount));
        let pickup = order.delivery_method == salon_shop_core::pricing::DeliveryMethod::Pickup;

        let html = OrderConfirmationHtml {
            store_name: &self.branding.store_name,
            customer_name: &order.customer_name,
            order_number: &order.order_number,
            lines: &lines,
            subtotal: self.branding.money(order.subtotal),
            shipping: self.branding.money(order.shipping_fee),
            discount: discount.clone(),
            total: self.branding.money(order.total),
            pickup,
            pickup_address: self.branding.pickup_address.as_deref(),
            shipping_address: order.shipping_address.as_deref(),
        }
        .render()?;
        let text = OrderConfirmationText {
            store_name: &self.branding.store_name,
            customer_name: &order.customer_name,
            order_number: &order.order_number,
            lines: &lines,
            subtotal: self.branding.money(order.subtotal),
            shipping: self.branding.money(order.shipping_fee),
            discount,
            total: self.branding.money(order.total),
            pickup,
            pickup_address: self.branding.pickup_address.as_deref(),
            shipping_address: order.shipping_address.as_deref(),
        }
        .render()?;

        let subject = format!("{} order {}", self.branding.store_name, order.order_number);
        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send the "we got your booking" notice.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_appointment_confirmation(
        &self,
        appointment: &Appointment,
    ) -> Result<(), EmailError> {
        let when = self.branding.local_time(appointment.scheduled_at);
        let html = AppointmentConfirmationHtml {
            store_name: &self.branding.store_name,
            customer_name: &appointment.customer_name,
            service_name: &appointment.service_name,
            stylist_name: appointment.stylist_name.as_deref(),
            when: &when,
        }
        .render()?;
        let text = AppointmentConfirmationText {
            store_name: &self.branding.store_name,
            customer_name: &appointment.customer_name,
            service_name: &appointment.service_name,
            stylist_name: appointment.stylist_name.as_deref(),
            when: &when,
        }
        .render()?;

        let subject = format!("Your {} booking request", self.branding.store_name);
        self.send_multipart_email(appointment.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send the day-before reminder.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_appointment_reminder(&self, appointment: &Appointment) -> Result<(), EmailError> {
        let when = self.branding.local_time(appointment.scheduled_at);
        let html = AppointmentReminderHtml {
            store_name: &self.branding.store_name,
            customer_name: &appointment.customer_name,
            service_name: &appointment.service_name,
            stylist_name: appointment.stylist_name.as_deref(),
            when: &when,
        }
        .render()?;
        let text = AppointmentReminderText {
            store_name: &self.branding.store_name,
            customer_name: &appointment.customer_name,
            service_name: &appointment.service_name,
            stylist_name: appointment.stylist_name.as_deref(),
            when: &when,
        }
        .render()?;

        let subject = format!("Reminder: your {} appointment", self.branding.store_name);
        self.send_multipart_email(appointment.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn branding() -> Branding {
        Branding {
            store_name: "Studio Nine".to_string(),
            currency_symbol: "$",
            pickup_address: Some("9 Main St".to_string()),
            utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        }
    }

    #[test]
    fn test_money_formatting() {
        let b = branding();
        assert_eq!(b.money(Decimal::new(125, 1)), "$12.50");
        assert_eq!(b.money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_local_time_uses_salon_offset() {
        let b = branding();
        let at = Utc.with_ymd_and_hms(2026, 3, 5, 8, 30, 0).unwrap();
        assert_eq!(b.local_time(at), "Thursday 5 March 2026 at 10:30");
    }

    #[test]
    fn test_reminder_templates_render() {
        let html = AppointmentReminderHtml {
            store_name: "Studio Nine",
            customer_name: "Dana",
            service_name: "Cut & Blow-dry",
            stylist_name: Some("Mia"),
            when: "Thursday 5 March 2026 at 10:30",
        }
        .render()
        .unwrap();
        assert!(html.contains("Dana"));
        assert!(html.contains("Cut &amp; Blow-dry"));
        assert!(html.contains("Mia"));

        let text = AppointmentReminderText {
            store_name: "Studio Nine",
            customer_name: "Dana",
            service_name: "Cut & Blow-dry",
            stylist_name: None,
            when: "Thursday 5 March 2026 at 10:30",
        }
        .render()
        .unwrap();
        assert!(text.contains("Cut & Blow-dry"));
        assert!(!text.contains("with "));
    }

    #[test]
    fn test_order_template_lists_lines() {
        let lines = vec![LineView {
            name: "Argan Oil (100ml)".to_string(),
            quantity: 2,
            line_total: "$30.00".to_string(),
        }];
        let text = OrderConfirmationText {
            store_name: "Studio Nine",
            customer_name: "Dana",
            order_number: "ORD-20260305-ABC234",
            lines: &lines,
            subtotal: "$30.00".to_string(),
            shipping: "$0.00".to_string(),
            discount: Some("$5.00".to_string()),
            total: "$25.00".to_string(),
            pickup: true,
            pickup_address: Some("9 Main St"),
            shipping_address: None,
        }
        .render()
        .unwrap();
        assert!(text.contains("ORD-20260305-ABC234"));
        assert!(text.contains("2 x Argan Oil (100ml)"));
        assert!(text.contains("Discount: -$5.00"));
        assert!(text.contains("9 Main St"));
    }
}
