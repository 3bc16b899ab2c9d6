//! Typed views of the Attendance Service's academic records.
//!
//! These are transient: a page deserializes them, derives what it needs and
//! drops them. Optional fields are optional because different endpoints send
//! different subsets of the same record.

use std::{ fmt, marker::PhantomData };

use serde::{
    de::{ MapAccess, Visitor },
    ser::SerializeMap,
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub dept_code: String,
    #[serde(default)]
    pub dept_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub roll_no: String,
    #[serde(default)]
    pub enrollment_no: String,
    pub name: String,
    #[serde(default)]
    pub batch_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: i64,
    #[serde(default, alias = "dept_code")]
    pub dept_name: Option<String>,
    #[serde(default, alias = "class_name")]
    pub class_number: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub semester: Option<i32>,
    #[serde(default)]
    pub student_count: Option<u32>,
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Batch {
    /// "CSE 2 (2024-25 Sem 3)", dropping whatever parts are unknown.
    pub fn display_name(&self) -> String {
        let mut name = [self.dept_name.as_deref(), self.class_number.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            name = format!("Batch {}", self.id);
        }
        match (&self.academic_year, self.semester) {
            (Some(year), Some(sem)) => format!("{} ({} Sem {})", name, year, sem),
            (None, Some(sem)) => format!("{} (Sem {})", name, sem),
            _ => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub subject_code: String,
    pub subject_name: String,
    #[serde(default)]
    pub dept_code: Option<String>,
    #[serde(default)]
    pub semester: Option<i32>,
}

impl Subject {
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.subject_name, self.subject_code)
    }

    pub fn as_option(&self) -> SubjectOption {
        SubjectOption { id: self.id, name: self.display_name() }
    }
}

/// `{id, name}` pairs returned by the subjects-by-batch endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectOption {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub username: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LectureType {
    Theory,
    Practical,
    Tutorial,
    Other(String),
}

impl LectureType {
    pub fn code(&self) -> &str {
        match self {
            LectureType::Theory => "TH",
            LectureType::Practical => "PR",
            LectureType::Tutorial => "TU",
            LectureType::Other(code) => code,
        }
    }

    /// Practicals and tutorials are held per sub-batch.
    pub fn uses_sub_batches(&self) -> bool {
        matches!(self, LectureType::Practical | LectureType::Tutorial)
    }
}

impl From<&str> for LectureType {
    fn from(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "TH" => LectureType::Theory,
            "PR" => LectureType::Practical,
            "TU" => LectureType::Tutorial,
            _ => LectureType::Other(code.trim().to_string()),
        }
    }
}

impl fmt::Display for LectureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for LectureType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for LectureType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(LectureType::from(code.as_str()))
    }
}

/// Flat assignment row as listed on the admin and HOD dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub staff_id: i64,
    #[serde(default)]
    pub staff_name: Option<String>,
    pub subject_id: i64,
    #[serde(default)]
    pub subject_name: Option<String>,
    pub batch_id: i64,
    #[serde(default)]
    pub batch_name: Option<String>,
    pub lecture_type: LectureType,
    #[serde(default)]
    pub batch_number: Option<i32>,
}

/// One sub-batch slot of a staff assignment. The service has sent both bare
/// numbers (or null for "whole batch") and `{assignment_id, batch_number}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubBatchEntry {
    Number(Option<i32>),
    Detailed {
        #[serde(default)]
        assignment_id: Option<i64>,
        #[serde(default)]
        batch_number: Option<i32>,
    },
}

impl SubBatchEntry {
    pub fn batch_number(&self) -> Option<i32> {
        match self {
            SubBatchEntry::Number(number) => *number,
            SubBatchEntry::Detailed { batch_number, .. } => *batch_number,
        }
    }
}

/// A subject/batch pairing assigned to the logged-in staff member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffAssignment {
    #[serde(default)]
    pub subject_id: i64,
    #[serde(default)]
    pub subject_code: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub classroom_id: Option<i64>,
    #[serde(default)]
    pub classroom_name: Option<String>,
    #[serde(default)]
    pub batch_id: Option<i64>,
    #[serde(default)]
    pub batch_name: Option<String>,
    #[serde(default)]
    pub lecture_types: LectureTypes,
}

/// Object entries in the order the service sent them.
fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where D: Deserializer<'de>, V: Deserialize<'de>
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
            while let Some(entry) = map.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}

/// Lecture-type code to sub-batch slots, kept in first-seen order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LectureTypes(Vec<(String, Vec<SubBatchEntry>)>);

impl LectureTypes {
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(code, _)| code)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<SubBatchEntry>)> {
        self.0.iter().map(|(code, slots)| (code, slots))
    }

    pub fn get(&self, code: &str) -> Option<&Vec<SubBatchEntry>> {
        self.0
            .iter()
            .find(|(key, _)| key == code)
            .map(|(_, slots)| slots)
    }
}

impl Serialize for LectureTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (code, slots) in &self.0 {
            map.serialize_entry(code, slots)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LectureTypes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered_entries(deserializer).map(LectureTypes)
    }
}

/// Keyed form of the staff assignment list, in document order.
struct KeyedAssignments(Vec<(String, StaffAssignment)>);

impl<'de> Deserialize<'de> for KeyedAssignments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered_entries(deserializer).map(KeyedAssignments)
    }
}

/// The staff assignment list, accepted either as an array or as an object
/// keyed by subject id.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(transparent)]
pub struct StaffAssignments(pub Vec<StaffAssignment>);

impl<'de> Deserialize<'de> for StaffAssignments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            List(Vec<StaffAssignment>),
            Keyed(KeyedAssignments),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::List(list) => StaffAssignments(list),
            Raw::Keyed(KeyedAssignments(entries)) =>
                StaffAssignments(
                    entries
                        .into_iter()
                        .map(|(key, mut assignment)| {
                            if assignment.subject_id == 0 {
                                assignment.subject_id = key.parse().unwrap_or_default();
                            }
                            assignment
                        })
                        .collect()
                ),
        })
    }
}

impl StaffAssignments {
    pub fn iter(&self) -> std::slice::Iter<'_, StaffAssignment> {
        self.0.iter()
    }
}
