//! The editable front-matter fields of a cover page

use serde::{Deserialize, Serialize};

use crate::document::ImageSource;
use crate::logo::DataUri;

/// Every free-text field of [`CoverFields`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Institution,
    Author,
    RollNumber,
    Subject,
    Topic,
    Program,
    Semester,
    SubmissionDate,
    Supervisor,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Institution,
        Field::Author,
        Field::RollNumber,
        Field::Subject,
        Field::Topic,
        Field::Program,
        Field::Semester,
        Field::SubmissionDate,
        Field::Supervisor,
    ];

    /// Form label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::Institution => "University Institution",
            Field::Author => "Your Name",
            Field::RollNumber => "Roll Number",
            Field::Subject => "Subject / Course",
            Field::Topic => "Assignment Topic / Title",
            Field::Program => "Degree Program",
            Field::Semester => "Current Semester",
            Field::SubmissionDate => "Submission Deadline",
            Field::Supervisor => "Supervising Professor",
        }
    }
}

/// Front-matter of the cover page
///
/// No field is validated: empty strings are legal everywhere and simply
/// render as empty text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverFields {
    pub institution: String,
    pub author: String,
    pub roll_number: String,
    pub subject: String,
    pub topic: String,
    pub program: String,
    pub semester: String,
    pub submission_date: String,
    pub supervisor: String,
    pub show_logo: bool,
    #[serde(skip)]
    pub custom_logo: Option<DataUri>,
}

impl Default for CoverFields {
    fn default() -> Self {
        Self {
            institution: String::new(),
            author: String::new(),
            roll_number: String::new(),
            subject: String::new(),
            topic: String::new(),
            program: String::new(),
            semester: String::new(),
            submission_date: String::new(),
            supervisor: String::new(),
            show_logo: true,
            custom_logo: None,
        }
    }
}

impl CoverFields {
    /// Sample values a fresh session starts with
    pub fn sample() -> Self {
        Self {
            institution: "Emerson University, Multan".to_string(),
            author: "Muhammad Ayoub".to_string(),
            roll_number: "01".to_string(),
            subject: "Artificial Intelligence".to_string(),
            topic: "Foundations of Modern AI: Neural Architectures & Ethics".to_string(),
            program: "BSIT".to_string(),
            semester: "6th".to_string(),
            submission_date: "16 Feb 2026".to_string(),
            supervisor: "Dr. Shahzad Bhatti".to_string(),
            show_logo: true,
            custom_logo: None,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Institution => &self.institution,
            Field::Author => &self.author,
            Field::RollNumber => &self.roll_number,
            Field::Subject => &self.subject,
            Field::Topic => &self.topic,
            Field::Program => &self.program,
            Field::Semester => &self.semester,
            Field::SubmissionDate => &self.submission_date,
            Field::Supervisor => &self.supervisor,
        }
    }

    /// Replace one field wholesale, leaving all others untouched
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Institution => &mut self.institution,
            Field::Author => &mut self.author,
            Field::RollNumber => &mut self.roll_number,
            Field::Subject => &mut self.subject,
            Field::Topic => &mut self.topic,
            Field::Program => &mut self.program,
            Field::Semester => &mut self.semester,
            Field::SubmissionDate => &mut self.submission_date,
            Field::Supervisor => &mut self.supervisor,
        };
        *slot = value.into();
    }

    pub fn set_logo(&mut self, logo: DataUri) {
        self.custom_logo = Some(logo);
    }

    /// Drop the custom logo; a no-op when none is set
    pub fn remove_logo(&mut self) {
        self.custom_logo = None;
    }

    /// Image the templates draw, or `None` when the logo is hidden
    pub fn logo_source(&self) -> Option<ImageSource> {
        if !self.show_logo {
            return None;
        }
        Some(match &self.custom_logo {
            Some(uri) => ImageSource::Custom(uri.clone()),
            None => ImageSource::DefaultLogo,
        })
    }
}
