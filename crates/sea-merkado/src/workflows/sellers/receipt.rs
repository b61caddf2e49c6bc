use std::fmt;
use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::compliance::CompliancePolicy;
use super::domain::{RequirementKind, SellerRecord};

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub requirement: RequirementKind,
    pub label: &'static str,
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Printable snapshot of a seller, using the same threshold as the live status.
#[derive(Debug, Clone, Serialize)]
pub struct SellerReceipt {
    pub unique_id: String,
    pub name: String,
    pub email: String,
    pub status: &'static str,
    pub display_status: &'static str,
    pub date_added: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub days_since_registration: i64,
    pub requirements: Vec<ReceiptLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    unique_id: &'a str,
    name: &'a str,
    email: &'a str,
    status: &'a str,
    display_status: &'a str,
    days_since_registration: i64,
    requirement: &'a str,
    submitted: &'a str,
    file_name: &'a str,
    warning: &'a str,
}

impl SellerReceipt {
    pub fn build(record: &SellerRecord, now: DateTime<Utc>, policy: &CompliancePolicy) -> Self {
        let assessment = policy.assess(record, now);

        let requirements = RequirementKind::ALL
            .into_iter()
            .map(|kind| ReceiptLine {
                requirement: kind,
                label: kind.label(),
                submitted: record.requirements.get(kind),
                file_name: record.file_for(kind).map(|file| file.file_name.clone()),
            })
            .collect();

        let warning = assessment.deadline_warning().then(|| {
            format!(
                "Registered {} days ago with incomplete requirements; subject to automatic rejection after {} days",
                assessment.days_since_registration, assessment.deadline_days
            )
        });

        Self {
            unique_id: record.unique_id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            status: record.status.label(),
            display_status: assessment.display_status.label(),
            date_added: record.date_added,
            generated_at: now,
            days_since_registration: assessment.days_since_registration,
            requirements,
            warning,
        }
    }

    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// One CSV row per requirement.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let warning = self.warning.as_deref().unwrap_or("");
        for line in &self.requirements {
            csv_writer.serialize(CsvRow {
                unique_id: &self.unique_id,
                name: &self.name,
                email: &self.email,
                status: self.status,
                display_status: self.display_status,
                days_since_registration: self.days_since_registration,
                requirement: line.label,
                submitted: if line.submitted { "yes" } else { "no" },
                file_name: line.file_name.as_deref().unwrap_or(""),
                warning,
            })?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|err| csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, err)))
    }
}

impl fmt::Display for SellerReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Seller receipt {}", self.unique_id)?;
        writeln!(f, "Name: {}", self.name)?;
        if !self.email.is_empty() {
            writeln!(f, "Email: {}", self.email)?;
        }
        writeln!(
            f,
            "Registered: {} ({} days ago)",
            self.date_added.format("%Y-%m-%d %H:%M UTC"),
            self.days_since_registration
        )?;
        writeln!(
            f,
            "Status: {} (stored: {})",
            self.display_status, self.status
        )?;
        writeln!(f, "Requirements:")?;
        for line in &self.requirements {
            let mark = if line.submitted { "x" } else { " " };
            match &line.file_name {
                Some(file) => writeln!(f, "  [{mark}] {} ({file})", line.label)?,
                None => writeln!(f, "  [{mark}] {}", line.label)?,
            }
        }
        if let Some(warning) = &self.warning {
            writeln!(f, "WARNING: {warning}")?;
        }
        writeln!(
            f,
            "Generated {}",
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}
