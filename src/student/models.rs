use serde::{Deserialize, Deserializer, Serialize};

/// Student record as served by the upstream API.
///
/// String fields are never `null` after decoding; a missing or `null` value
/// becomes the empty string, which the report treats as "not provided".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub system_access: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dob: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub class: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub section: String,
    #[serde(default)]
    pub roll: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub father_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub father_phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mother_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mother_phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub guardian_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub guardian_phone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub relation_of_guardian: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub current_address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub permanent_address: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub admission_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub reporter_name: String,
}

/// Wrapper shape some upstream versions respond with.
#[derive(Debug, Deserialize)]
pub struct StudentEnvelope {
    #[serde(default)]
    pub student: Option<StudentRecord>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StudentEnvelope {
    /// True when the envelope carries no record and its text reports a miss.
    pub fn reports_not_found(&self) -> bool {
        self.student.is_none()
            && [&self.error, &self.message]
                .into_iter()
                .flatten()
                .any(|text| text.to_ascii_lowercase().contains("not found"))
    }
}

/// A 200 body: either the bare record or the envelope around it.
///
/// The bare form is tried first; it requires `id`, which the envelope lacks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StudentPayload {
    Bare(StudentRecord),
    Wrapped(StudentEnvelope),
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}
