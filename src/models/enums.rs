/// Macro to declare the label → code table of one categorical field.
///
/// Entries are declared in the order the form offers them. The table and the
/// label list come from the same declaration, so every label shown to a user
/// is guaranteed to have a code.
macro_rules! code_table {
    ($table:ident, $labels:ident, { $($s:literal = $code:literal),+ $(,)? }) => {
        pub const $table: &[(&str, u8)] = &[$(($s, $code)),+];
        pub const $labels: &[&str] = &[$($s),+];
    };
}

code_table!(GENDER_CODES, GENDER_LABELS, {
    "Male" = 1,
    "Female" = 0,
    "Other" = 2,
});

code_table!(EVER_MARRIED_CODES, EVER_MARRIED_LABELS, {
    "Yes" = 1,
    "No" = 0,
});

code_table!(WORK_TYPE_CODES, WORK_TYPE_LABELS, {
    "Private" = 2,
    "Self-employed" = 3,
    "Govt_job" = 1,
    "Children" = 0,
    "Never_worked" = 4,
});

code_table!(RESIDENCE_TYPE_CODES, RESIDENCE_TYPE_LABELS, {
    "Urban" = 1,
    "Rural" = 0,
});

code_table!(SMOKING_STATUS_CODES, SMOKING_STATUS_LABELS, {
    "formerly smoked" = 1,
    "never smoked" = 2,
    "smokes" = 3,
    "Unknown" = 0,
});

/// The five categorical inputs of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Gender,
    EverMarried,
    WorkType,
    ResidenceType,
    SmokingStatus,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        Self::Gender,
        Self::EverMarried,
        Self::WorkType,
        Self::ResidenceType,
        Self::SmokingStatus,
    ];

    /// Column name the classifier was trained with.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::EverMarried => "ever_married",
            Self::WorkType => "work_type",
            Self::ResidenceType => "Residence_type",
            Self::SmokingStatus => "smoking_status",
        }
    }

    /// Label shown next to the dropdown.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::EverMarried => "Ever Married",
            Self::WorkType => "Work Type",
            Self::ResidenceType => "Residence Type",
            Self::SmokingStatus => "Smoking Status",
        }
    }

    /// Label → code table, in form order.
    pub fn table(&self) -> &'static [(&'static str, u8)] {
        match self {
            Self::Gender => GENDER_CODES,
            Self::EverMarried => EVER_MARRIED_CODES,
            Self::WorkType => WORK_TYPE_CODES,
            Self::ResidenceType => RESIDENCE_TYPE_CODES,
            Self::SmokingStatus => SMOKING_STATUS_CODES,
        }
    }

    /// The labels a user may pick, in form order.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Gender => GENDER_LABELS,
            Self::EverMarried => EVER_MARRIED_LABELS,
            Self::WorkType => WORK_TYPE_LABELS,
            Self::ResidenceType => RESIDENCE_TYPE_LABELS,
            Self::SmokingStatus => SMOKING_STATUS_LABELS,
        }
    }

    /// Preselected option: the first one offered.
    pub fn default_label(&self) -> &'static str {
        self.table()[0].0
    }
}
