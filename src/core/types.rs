use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::time::TimeSpec;

/// Editable form fields, in the order their literal values are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    Title,
    Donor,
    SubmissionDate,
    ObjectDate,
    Medium,
    AccessionNumber,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Donor,
        FormField::SubmissionDate,
        FormField::ObjectDate,
        FormField::Medium,
        FormField::AccessionNumber,
        FormField::Description,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Text last typed into each form field, kept so a reload shows exactly what
/// the user entered even when parsing changed the stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValues(pub [String; 7]);

impl FieldValues {
    pub fn get(&self, field: FormField) -> &str {
        &self.0[field.index()]
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.0[field.index()] = value.into();
    }
}

/// Text fields that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringField {
    Title,
    Donor,
    Description,
    Medium,
    AccessionNumber,
}

/// Date fields that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeField {
    ObjectDate,
    SubmissionDate,
}

/// Any searchable field, as offered by a search box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchField {
    Text(StringField),
    Time(TimeField),
}

/// Which of the four levels of a V3D bundle are populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleKind {
    Level,
    Full360,
    TopOnly,
    BottomOnly,
}

/// Image names for the pseudo-3D viewer. The four side views are required;
/// top and bottom are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct V3DBundle {
    pub front: String,
    pub right: String,
    pub back: String,
    pub left: String,
    pub top: Option<String>,
    pub bottom: Option<String>,
}

impl V3DBundle {
    pub const FRONT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BACK: usize = 2;
    pub const LEFT: usize = 3;
    pub const BOTTOM: usize = 4;
    pub const TOP: usize = 5;

    pub fn new(front: &str, right: &str, back: &str, left: &str) -> Result<Self> {
        if [front, right, back, left].iter().any(|name| name.trim().is_empty()) {
            return Err(Error::new(
                ErrorKind::InvalidArgument,
                "V3D bundle needs front, right, back and left images".to_string(),
            ));
        }

        Ok(V3DBundle {
            front: front.to_string(),
            right: right.to_string(),
            back: back.to_string(),
            left: left.to_string(),
            top: None,
            bottom: None,
        })
    }

    pub fn with_top_bottom(mut self, top: &str, bottom: &str) -> Self {
        self.top = Some(top.to_string());
        self.bottom = Some(bottom.to_string());
        self
    }

    pub fn with_top_only(mut self, top: &str) -> Self {
        self.top = Some(top.to_string());
        self.bottom = None;
        self
    }

    pub fn with_bottom_only(mut self, bottom: &str) -> Self {
        self.top = None;
        self.bottom = Some(bottom.to_string());
        self
    }

    pub fn kind(&self) -> BundleKind {
        match (&self.top, &self.bottom) {
            (Some(_), Some(_)) => BundleKind::Full360,
            (Some(_), None) => BundleKind::TopOnly,
            (None, Some(_)) => BundleKind::BottomOnly,
            (None, None) => BundleKind::Level,
        }
    }

    /// Six viewer slots: front, right, back, left, bottom, top
    pub fn final_images(&self) -> [Option<&str>; 6] {
        [
            Some(self.front.as_str()),
            Some(self.right.as_str()),
            Some(self.back.as_str()),
            Some(self.left.as_str()),
            self.bottom.as_deref(),
            self.top.as_deref(),
        ]
    }
}

/// Resources attached to an artifact: plain images or a V3D bundle, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactMedia {
    Images(Vec<String>),
    Bundle(V3DBundle),
}

impl Default for ArtifactMedia {
    fn default() -> Self {
        ArtifactMedia::Images(Vec::new())
    }
}

/// One catalogued item. The accession number is its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub accession_number: String,
    pub title: String,
    pub donor: String,
    pub medium: String,
    pub description: String,
    pub object_date: TimeSpec,
    pub submission_date: TimeSpec,
    pub media: ArtifactMedia,
    pub field_values: FieldValues,
}

impl Artifact {
    pub fn new(accession_number: &str, title: &str, object_date: TimeSpec, submission_date: TimeSpec) -> Self {
        Artifact {
            accession_number: accession_number.to_string(),
            title: title.to_string(),
            donor: String::new(),
            medium: String::new(),
            description: String::new(),
            object_date,
            submission_date,
            media: ArtifactMedia::default(),
            field_values: FieldValues::default(),
        }
    }

    /// Empty artifact dated now, used as a form template or a query
    pub fn generic() -> Self {
        Artifact::new("", "", TimeSpec::now(), TimeSpec::now())
    }

    /// Query artifact holding `text` in `field`. Time fields get a literal
    /// placeholder; use `Database::search_text` to parse dates first.
    pub fn query(field: SearchField, text: &str) -> Self {
        let mut query = Artifact::generic();
        match field {
            SearchField::Text(field) => *query.string_field_mut(field) = text.to_string(),
            SearchField::Time(field) => *query.time_field_mut(field) = TimeSpec::literal(text),
        }
        query
    }

    pub fn with_donor(mut self, donor: &str) -> Self {
        self.donor = donor.to_string();
        self
    }

    pub fn with_medium(mut self, medium: &str) -> Self {
        self.medium = medium.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn string_field(&self, field: StringField) -> &str {
        match field {
            StringField::Title => &self.title,
            StringField::Donor => &self.donor,
            StringField::Description => &self.description,
            StringField::Medium => &self.medium,
            StringField::AccessionNumber => &self.accession_number,
        }
    }

    pub fn string_field_mut(&mut self, field: StringField) -> &mut String {
        match field {
            StringField::Title => &mut self.title,
            StringField::Donor => &mut self.donor,
            StringField::Description => &mut self.description,
            StringField::Medium => &mut self.medium,
            StringField::AccessionNumber => &mut self.accession_number,
        }
    }

    pub fn time_field(&self, field: TimeField) -> &TimeSpec {
        match field {
            TimeField::ObjectDate => &self.object_date,
            TimeField::SubmissionDate => &self.submission_date,
        }
    }

    pub fn time_field_mut(&mut self, field: TimeField) -> &mut TimeSpec {
        match field {
            TimeField::ObjectDate => &mut self.object_date,
            TimeField::SubmissionDate => &mut self.submission_date,
        }
    }

    pub fn configure_image(&mut self, name: &str) {
        self.media = ArtifactMedia::Images(vec![name.to_string()]);
    }

    pub fn configure_multi_image(&mut self, names: Vec<String>) {
        self.media = ArtifactMedia::Images(names);
    }

    pub fn configure_3d(&mut self, bundle: V3DBundle) {
        self.media = ArtifactMedia::Bundle(bundle);
    }

    pub fn is_3d_supported(&self) -> bool {
        matches!(self.media, ArtifactMedia::Bundle(_))
    }

    /// Plain image names; empty in bundle mode
    pub fn filenames(&self) -> &[String] {
        match &self.media {
            ArtifactMedia::Images(names) => names,
            ArtifactMedia::Bundle(_) => &[],
        }
    }

    pub fn bundle(&self) -> Option<&V3DBundle> {
        match &self.media {
            ArtifactMedia::Bundle(bundle) => Some(bundle),
            ArtifactMedia::Images(_) => None,
        }
    }

    /// Every resource name this artifact refers to
    pub fn resource_names(&self) -> Vec<&str> {
        match &self.media {
            ArtifactMedia::Images(names) => names.iter().map(String::as_str).collect(),
            ArtifactMedia::Bundle(bundle) => bundle.final_images().into_iter().flatten().collect(),
        }
    }
}
