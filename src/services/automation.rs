//! Follow-up saga run after a helpdesk contact: helpdesk contact record, CRM
//! signup, CRM tagging. Each step's outcome is recorded; none of them can fail
//! the request that triggered the saga.

use serde::Serialize;
use tracing::{info, warn};

use crate::models::monitor::{MonitorLevel, MonitorLog};
use crate::models::signup::SignupRecord;
use crate::services::action_network::{ActionNetworkClient, PersonSignup};
use crate::services::freshdesk::{ContactResult, FreshdeskClient, NewContact};

pub const CONTACT_TAG: &str = "contact-form";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    Succeeded { detail: String },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AutomationReport {
    pub steps: Vec<StepRecord>,
}

impl AutomationReport {
    pub fn outcome(&self, step: &str) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| s.step == step).map(|s| &s.outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.outcome, StepOutcome::Failed { .. }))
    }
}

pub struct ContactAutomation<'a> {
    pub freshdesk: &'a FreshdeskClient,
    pub action_network: &'a ActionNetworkClient,
    pub monitor: &'a MonitorLog,
    pub campaign: &'a str,
    pub contact_tag_id: Option<&'a str>,
}

impl ContactAutomation<'_> {
    fn record(
        &self,
        report: &mut AutomationReport,
        step: &'static str,
        outcome: StepOutcome,
        email: &str,
    ) {
        let level = match &outcome {
            StepOutcome::Succeeded { detail } => {
                info!("Automation step {} for {} succeeded: {}", step, email, detail);
                MonitorLevel::Info
            }
            StepOutcome::Skipped { reason } => {
                info!("Automation step {} for {} skipped: {}", step, email, reason);
                MonitorLevel::Info
            }
            StepOutcome::Failed { error } => {
                warn!("Automation step {} for {} failed: {}", step, email, error);
                MonitorLevel::Warn
            }
        };
        self.monitor.record(
            level,
            format!("automation.{}", step),
            serde_json::to_value(&outcome).ok(),
        );
        report.steps.push(StepRecord { step, outcome });
    }

    pub async fn run(&self, record: &SignupRecord, ticket_id: Option<u64>) -> AutomationReport {
        let mut report = AutomationReport::default();
        let email = record.email.as_str();

        let helpdesk = match ticket_id {
            Some(id) => StepOutcome::Skipped {
                reason: format!("ticket {} already holds the contact", id),
            },
            None => {
                let contact = NewContact {
                    name: record.full_name(),
                    email: record.email.clone(),
                    phone: record.phone.clone(),
                    tags: vec![CONTACT_TAG.to_string()],
                };
                match self.freshdesk.create_contact(&contact).await {
                    Ok(ContactResult::Created(c)) => StepOutcome::Succeeded {
                        detail: format!("contact {} created", c.id),
                    },
                    Ok(ContactResult::AlreadyExists) => StepOutcome::Succeeded {
                        detail: "contact already exists".to_string(),
                    },
                    Err(e) => StepOutcome::Failed { error: e.to_string() },
                }
            }
        };
        self.record(&mut report, "helpdesk_contact", helpdesk, email);

        let payload =
            PersonSignup::from_record(record, self.campaign, vec![CONTACT_TAG.to_string()]);
        let (signup, person_href) = match self.action_network.signup(&payload).await {
            Ok(outcome) => (
                StepOutcome::Succeeded {
                    detail: format!("person {}", outcome.label()),
                },
                outcome.person().href().map(str::to_string),
            ),
            Err(e) => (StepOutcome::Failed { error: e.to_string() }, None),
        };
        let signup_failed = matches!(signup, StepOutcome::Failed { .. });
        self.record(&mut report, "crm_signup", signup, email);

        let tagging = match (self.contact_tag_id, person_href) {
            _ if signup_failed => StepOutcome::Skipped {
                reason: "crm signup failed".to_string(),
            },
            (None, _) => StepOutcome::Skipped {
                reason: "no contact tag configured".to_string(),
            },
            (Some(_), None) => StepOutcome::Skipped {
                reason: "crm did not return a person link".to_string(),
            },
            (Some(tag_id), Some(href)) => {
                match self.action_network.add_tagging(tag_id, &href).await {
                    Ok(()) => StepOutcome::Succeeded {
                        detail: format!("tagged with {}", tag_id),
                    },
                    Err(e) => StepOutcome::Failed { error: e.to_string() },
                }
            }
        };
        self.record(&mut report, "crm_tagging", tagging, email);

        report
    }
}
