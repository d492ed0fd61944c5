//! Emergency Alert
//!
//! Simulated contact sequencing: when triggered, available contacts are
//! notified in priority order, one every `stagger` interval, until the alert
//! is cancelled. Nothing is actually dialed.

use crate::config::Config;
use crate::error::{VoiceAidError, VoiceAidResult};
use crate::i18n::tr;
use crate::notify::{Notice, Notifier};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub relation: String,
    pub phone: String,
    /// Lower is contacted first
    pub priority: u32,
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalInfo {
    pub blood_type: String,
    pub allergies: Vec<String>,
    pub medications: Vec<String>,
    pub conditions: Vec<String>,
    pub emergency_notes: String,
}

impl MedicalInfo {
    /// Human-readable lines for display or sharing
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("Blood type: {}", self.blood_type),
            format!("Allergies: {}", self.allergies.join(", ")),
            format!("Medications: {}", self.medications.join(", ")),
            format!("Conditions: {}", self.conditions.join(", ")),
            format!("Notes: {}", self.emergency_notes),
        ]
    }
}

pub fn default_contacts() -> Vec<EmergencyContact> {
    let contact = |id: &str, name: &str, relation: &str, phone: &str, priority, available| {
        EmergencyContact {
            id: id.to_string(),
            name: name.to_string(),
            relation: relation.to_string(),
            phone: phone.to_string(),
            priority,
            available,
        }
    };
    vec![
        contact("1", "Dr. Priya Sharma", "Primary Doctor", "+91-9876543210", 1, true),
        contact("2", "Rajesh Kumar (Father)", "Family", "+91-9876543211", 2, true),
        contact("3", "Meera Devi (Mother)", "Family", "+91-9876543212", 3, false),
        contact("4", "Local Emergency Services", "Emergency", "108", 4, true),
    ]
}

pub fn default_medical_info() -> MedicalInfo {
    MedicalInfo {
        blood_type: "B+".to_string(),
        allergies: vec!["Penicillin".to_string(), "Peanuts".to_string()],
        medications: vec![
            "Vitamin D3".to_string(),
            "Speech therapy supplements".to_string(),
        ],
        conditions: vec!["Speech impairment".to_string(), "Mild anxiety".to_string()],
        emergency_notes: "Patient has speech difficulties. Please be patient with communication. \
                          Caregiver contact: +91-9876543211"
            .to_string(),
    }
}

/// Available contacts, lowest priority number first (ties keep list order)
pub fn contact_order(contacts: &[EmergencyContact]) -> Vec<EmergencyContact> {
    let mut order: Vec<EmergencyContact> =
        contacts.iter().filter(|c| c.available).cloned().collect();
    order.sort_by_key(|c| c.priority);
    order
}

/// Map link for a position
pub fn location_url(latitude: f64, longitude: f64) -> String {
    format!("https://maps.google.com/?q={},{}", latitude, longitude)
}

/// `m:ss`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

pub struct EmergencyAlert {
    contacts: Vec<EmergencyContact>,
    medical: MedicalInfo,
    notifier: Arc<dyn Notifier>,
    stagger: Duration,
    audit_path: Option<PathBuf>,
    started: Option<Instant>,
    contacted: Arc<AtomicUsize>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for EmergencyAlert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmergencyAlert")
            .field("active", &self.is_active())
            .field("contacted", &self.contacted())
            .finish()
    }
}

impl EmergencyAlert {
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            contacts: config.emergency_contacts.clone(),
            medical: config.medical_info.clone(),
            notifier,
            stagger: Duration::from_millis(config.emergency_stagger_ms),
            audit_path: Some(crate::audit::default_log_path()),
            started: None,
            contacted: Arc::new(AtomicUsize::new(0)),
            task: None,
        }
    }

    /// Audit destination; `None` disables audit logging
    pub fn with_audit_log(mut self, path: Option<PathBuf>) -> Self {
        self.audit_path = path;
        self
    }

    pub fn contacts(&self) -> &[EmergencyContact] {
        &self.contacts
    }

    pub fn medical_info(&self) -> &MedicalInfo {
        &self.medical
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }

    /// How many contacts have been notified since the last trigger
    pub fn contacted(&self) -> usize {
        self.contacted.load(Ordering::SeqCst)
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.started.map(|s| s.elapsed())
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed().unwrap_or_default())
    }

    /// Start the alert. Returns the contacts in the order they will be notified.
    pub fn trigger(&mut self) -> VoiceAidResult<Vec<EmergencyContact>> {
        if self.is_active() {
            return Err(VoiceAidError::Emergency("alert already active".to_string()));
        }

        let order = contact_order(&self.contacts);
        if order.is_empty() {
            warn!("⚠️ Emergency triggered with no available contacts");
        }

        let start = Instant::now();
        self.started = Some(start);
        self.contacted.store(0, Ordering::SeqCst);

        info!("🚨 Emergency alert activated, {} contacts queued", order.len());
        self.notifier.notify(Notice::error(
            tr("emergency.activated"),
            tr("emergency.activatedDescription"),
        ));
        self.audit(&format!(
            "Emergency alert activated ({} contacts)",
            order.len()
        ));

        let notifier = self.notifier.clone();
        let contacted = self.contacted.clone();
        let stagger = self.stagger;
        let queued = order.clone();
        self.task = Some(tokio::spawn(async move {
            for (i, contact) in queued.into_iter().enumerate() {
                tokio::time::sleep_until(start + stagger * i as u32).await;
                contacted.store(i + 1, Ordering::SeqCst);
                info!("📞 Contacting {} ({})", contact.name, contact.phone);
                notifier.notify(Notice::info(
                    format!("{} {}", tr("emergency.contacting"), contact.name),
                    format!("{} - {}", contact.relation, contact.phone),
                ));
            }
        }));

        Ok(order)
    }

    /// Stop contacting and reset. Returns false if no alert was active.
    pub fn cancel(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.started = None;
        self.contacted.store(0, Ordering::SeqCst);

        info!("✅ Emergency alert cancelled");
        self.notifier.notify(Notice::info(
            tr("emergency.cancelled"),
            tr("emergency.cancelledDescription"),
        ));
        self.audit("Emergency alert cancelled");
        true
    }

    /// Wait until every queued contact has been notified
    pub async fn wait_contacted(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }

    /// Simulated direct call to one contact
    pub fn call(&self, contact_id: &str) -> VoiceAidResult<&EmergencyContact> {
        let contact = self
            .contacts
            .iter()
            .find(|c| c.id == contact_id)
            .ok_or_else(|| VoiceAidError::Emergency(format!("unknown contact '{}'", contact_id)))?;
        self.notifier.notify(Notice::info(
            format!("{} {}", tr("emergency.calling"), contact.name),
            contact.relation.clone(),
        ));
        self.audit(&format!("Direct call to {} ({})", contact.name, contact.phone));
        Ok(contact)
    }

    fn audit(&self, entry: &str) {
        if let Some(path) = &self.audit_path {
            if let Err(e) = crate::audit::log_to(path, entry) {
                warn!("⚠️ Could not write audit log: {}", e);
            }
        }
    }
}

impl Drop for EmergencyAlert {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
