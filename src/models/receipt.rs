use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptTemplate {
    Default,
    Recurring,
    LargeDonation,
}

/// Static copy and branding for one receipt variant.
#[derive(Debug)]
pub struct TemplateCopy {
    pub subject: &'static str,
    pub heading: &'static str,
    pub intro: &'static str,
    pub impact: &'static [&'static str],
    pub next_steps: &'static [&'static str],
    pub footer: &'static str,
    pub primary_color: &'static str,
    pub accent_color: &'static str,
}

const DEFAULT_COPY: TemplateCopy = TemplateCopy {
    subject: "Thank you for your donation",
    heading: "Thank you for chipping in",
    intro: "Your donation goes straight into the work of winning this campaign.",
    impact: &[
        "Printing flyers and corflutes for local volunteers",
        "Running community events and street stalls",
        "Reaching voters through phone banks and doorknocking",
    ],
    next_steps: &[
        "Share the campaign with a friend",
        "Sign up to volunteer at an upcoming event",
    ],
    footer: "Authorised by the campaign. This receipt is for your records.",
    primary_color: "#1d3557",
    accent_color: "#e63946",
};

const RECURRING_COPY: TemplateCopy = TemplateCopy {
    subject: "Thank you for becoming a regular supporter",
    heading: "Welcome to our regular supporters",
    intro: "Regular donations let us plan ahead and keep organising all year round.",
    impact: &[
        "A steady budget for field organisers",
        "Ongoing community outreach between elections",
        "Rapid response when the campaign needs it most",
    ],
    next_steps: &[
        "Watch your inbox for supporter-only updates",
        "Reply to this email if you ever need to change your donation",
    ],
    footer: "Your donation will renew automatically until you cancel.",
    primary_color: "#2a9d8f",
    accent_color: "#e9c46a",
};

const LARGE_COPY: TemplateCopy = TemplateCopy {
    subject: "Thank you for your generous donation",
    heading: "Your generosity makes a real difference",
    intro: "A gift like yours funds entire weeks of campaigning.",
    impact: &[
        "Funding a full weekend of doorknocking across the electorate",
        "Paying for advertising in local papers and online",
        "Training new volunteers to lead their own teams",
    ],
    next_steps: &[
        "A member of the team may reach out to thank you personally",
        "Join us at an upcoming supporter event",
    ],
    footer: "Donations above the disclosure threshold may be reported as required by law.",
    primary_color: "#6a0dad",
    accent_color: "#f4a261",
};

impl ReceiptTemplate {
    /// Recurring always wins; otherwise $100 and up gets the large-donation copy.
    pub fn select(amount: Decimal, is_recurring: bool) -> Self {
        if is_recurring {
            ReceiptTemplate::Recurring
        } else if amount >= Decimal::ONE_HUNDRED {
            ReceiptTemplate::LargeDonation
        } else {
            ReceiptTemplate::Default
        }
    }

    pub fn copy(&self) -> &'static TemplateCopy {
        match self {
            ReceiptTemplate::Default => &DEFAULT_COPY,
            ReceiptTemplate::Recurring => &RECURRING_COPY,
            ReceiptTemplate::LargeDonation => &LARGE_COPY,
        }
    }

    pub fn subject(&self) -> &'static str {
        self.copy().subject
    }
}

pub fn first_name(donor_name: Option<&str>) -> &str {
    donor_name
        .and_then(|name| name.split_whitespace().next())
        .unwrap_or("there")
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("<li>{}</li>", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Interpolates the receipt HTML. `custom_message` and `donor_name` are
/// inserted as-is.
pub fn render_html(
    template: ReceiptTemplate,
    amount: Decimal,
    date: DateTime<Utc>,
    receipt_number: &str,
    custom_message: Option<&str>,
    donor_name: Option<&str>,
) -> String {
    let copy = template.copy();
    let custom_block = match custom_message.map(str::trim) {
        Some(message) if !message.is_empty() => format!(
            r#"<div class="custom-message"><p>{}</p></div>"#,
            message
        ),
        _ => String::new(),
    };

    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="utf-8">
            <title>{subject}</title>
            <style>
                body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
                .header {{
                    background-color: {primary}; color: white; padding: 20px; text-align: center;
                }}
                .content {{ padding: 20px; background-color: #f9f9f9; }}
                .amount {{ font-size: 28px; font-weight: bold; color: {accent}; }}
                .custom-message {{
                    border-left: 4px solid {accent}; padding-left: 12px; margin: 20px 0;
                }}
                .details td {{ padding: 4px 12px 4px 0; }}
                .footer {{ padding: 20px; text-align: center; color: #666; font-size: 12px; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="header">
                    <h1>{heading}</h1>
                </div>
                <div class="content">
                    <h2>Hi {first_name},</h2>
                    <p>{intro}</p>
                    {custom_block}
                    <p class="amount">${amount:.2} AUD</p>
                    <table class="details">
                        <tr><td>Date</td><td>{date}</td></tr>
                        <tr><td>Receipt number</td><td>{receipt_number}</td></tr>
                    </table>
                    <h3>Your donation helps with</h3>
                    <ul>
                    {impact}
                    </ul>
                    <h3>What happens next</h3>
                    <ul>
                    {next_steps}
                    </ul>
                </div>
                <div class="footer">
                    <p>{footer}</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        subject = copy.subject,
        primary = copy.primary_color,
        accent = copy.accent_color,
        heading = copy.heading,
        first_name = first_name(donor_name),
        intro = copy.intro,
        custom_block = custom_block,
        amount = amount,
        date = date.format("%-d %B %Y"),
        receipt_number = receipt_number,
        impact = bullet_list(copy.impact),
        next_steps = bullet_list(copy.next_steps),
        footer = copy.footer,
    )
}
