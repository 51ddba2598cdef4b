//! In-memory model of a student report: the ordered rows of its table.

use crate::student::StudentRecord;

/// Conceptual grouping of rows. Rendering does not depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Personal,
    Academic,
    Address,
    Family,
    Guardian,
    Reporter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub section: Section,
    pub label: &'static str,
    pub value: String,
    /// Emphasised rows render their value in the bold face.
    pub emphasis: bool,
}

impl Row {
    fn new(section: Section, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            section,
            label,
            value: value.into(),
            emphasis: false,
        }
    }

    fn emphasised(mut self) -> Self {
        self.emphasis = true;
        self
    }
}

/// The rows of one report, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub student_id: u64,
    pub rows: Vec<Row>,
}

impl ReportDocument {
    pub fn labels(&self) -> Vec<&'static str> {
        self.rows.iter().map(|r| r.label).collect()
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn system_access_label(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// Permanent address is shown only when it adds information.
pub fn shows_permanent_address(record: &StudentRecord) -> bool {
    !record.permanent_address.is_empty() && record.permanent_address != record.current_address
}

/// The guardian block is shown only for a guardian who is not a parent.
pub fn shows_guardian(record: &StudentRecord) -> bool {
    !record.guardian_name.is_empty()
        && record.guardian_name != record.father_name
        && record.guardian_name != record.mother_name
}

pub fn shows_reporter(record: &StudentRecord) -> bool {
    !record.reporter_name.is_empty()
}

/// Map a record to its report rows.
///
/// The order is fixed. Conditional rows are inserted at their fixed position
/// and never reorder the rows around them.
pub fn build_rows(record: &StudentRecord) -> ReportDocument {
    use Section::*;

    let roll = record.roll.map(|r| r.to_string()).unwrap_or_default();

    let mut rows = vec![
        Row::new(Personal, "Student ID", record.id.to_string()).emphasised(),
        Row::new(Personal, "Full Name", record.name.as_str()).emphasised(),
        Row::new(Personal, "Email", record.email.as_str()),
        Row::new(Personal, "Phone", record.phone.as_str()),
        Row::new(Personal, "Gender", record.gender.as_str()),
        Row::new(Personal, "Date of Birth", record.dob.as_str()),
        Row::new(Academic, "Admission Date", record.admission_date.as_str()),
        Row::new(Academic, "Class", record.class.as_str()),
        Row::new(Academic, "Section", record.section.as_str()),
        Row::new(Academic, "Roll Number", roll),
        Row::new(
            Academic,
            "System Access",
            system_access_label(record.system_access),
        ),
        Row::new(Address, "Current Address", record.current_address.as_str()),
    ];

    if shows_permanent_address(record) {
        rows.push(Row::new(
            Address,
            "Permanent Address",
            record.permanent_address.as_str(),
        ));
    }

    rows.extend([
        Row::new(Family, "Father Name", record.father_name.as_str()),
        Row::new(Family, "Father Phone", record.father_phone.as_str()),
        Row::new(Family, "Mother Name", record.mother_name.as_str()),
        Row::new(Family, "Mother Phone", record.mother_phone.as_str()),
    ]);

    if shows_guardian(record) {
        rows.extend([
            Row::new(Guardian, "Guardian Name", record.guardian_name.as_str()),
            Row::new(
                Guardian,
                "Guardian Relation",
                record.relation_of_guardian.as_str(),
            ),
            Row::new(Guardian, "Guardian Phone", record.guardian_phone.as_str()),
        ]);
    }

    if shows_reporter(record) {
        rows.push(Row::new(Reporter, "Reporter Name", record.reporter_name.as_str()));
    }

    ReportDocument {
        student_id: record.id,
        rows,
    }
}
