//! The patient information form: raw HTML input and its rendering.

use serde::{Deserialize, Serialize};

use crate::models::enums::CategoricalField;
use crate::models::patient::{
    FormError, NumericRange, PatientForm, AGE_RANGE, BMI_RANGE, GLUCOSE_RANGE,
};
use crate::ui::escape_html;

/// Form fields exactly as the browser posted them.
///
/// Kept as strings so whatever the user typed can be echoed back into the
/// form, even when it does not parse. Missing fields take the widget defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub gender: String,
    pub age: String,
    pub hypertension: String,
    pub heart_disease: String,
    pub ever_married: String,
    pub work_type: String,
    #[serde(rename = "Residence_type")]
    pub residence_type: String,
    pub avg_glucose_level: String,
    pub bmi: String,
    pub smoking_status: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self::from(&PatientForm::default())
    }
}

impl From<&PatientForm> for FormInput {
    fn from(form: &PatientForm) -> Self {
        Self {
            gender: form.gender.clone(),
            age: form.age.to_string(),
            hypertension: form.hypertension.to_string(),
            heart_disease: form.heart_disease.to_string(),
            ever_married: form.ever_married.clone(),
            work_type: form.work_type.clone(),
            residence_type: form.residence_type.clone(),
            avg_glucose_level: form.avg_glucose_level.to_string(),
            bmi: form.bmi.to_string(),
            smoking_status: form.smoking_status.clone(),
        }
    }
}

impl FormInput {
    /// Parse the numeric fields. Ranges and labels are checked later, when
    /// the form is encoded.
    pub fn parse(&self) -> Result<PatientForm, FormError> {
        Ok(PatientForm {
            gender: self.gender.clone(),
            age: parse_number("age", &self.age)?,
            hypertension: parse_number("hypertension", &self.hypertension)?,
            heart_disease: parse_number("heart_disease", &self.heart_disease)?,
            ever_married: self.ever_married.clone(),
            work_type: self.work_type.clone(),
            residence_type: self.residence_type.clone(),
            avg_glucose_level: parse_number("avg_glucose_level", &self.avg_glucose_level)?,
            bmi: parse_number("bmi", &self.bmi)?,
            smoking_status: self.smoking_status.clone(),
        })
    }

    fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::EverMarried => &self.ever_married,
            CategoricalField::WorkType => &self.work_type,
            CategoricalField::ResidenceType => &self.residence_type,
            CategoricalField::SmokingStatus => &self.smoking_status,
        }
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    raw.trim().parse().map_err(|_| FormError::NotANumber {
        field,
        value: raw.to_string(),
    })
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

/// Two-column form, dropdown options generated from the encoder tables.
pub fn render_form(input: &FormInput) -> String {
    let left = [
        select_categorical(input, CategoricalField::Gender),
        number_input("age", "Age", &input.age, &AGE_RANGE),
        select_flag("hypertension", "Hypertension", &input.hypertension),
        select_flag("heart_disease", "Heart Disease", &input.heart_disease),
        select_categorical(input, CategoricalField::EverMarried),
    ]
    .concat();
    let right = [
        select_categorical(input, CategoricalField::WorkType),
        select_categorical(input, CategoricalField::ResidenceType),
        number_input(
            "avg_glucose_level",
            "Average Glucose Level",
            &input.avg_glucose_level,
            &GLUCOSE_RANGE,
        ),
        number_input("bmi", "BMI", &input.bmi, &BMI_RANGE),
        select_categorical(input, CategoricalField::SmokingStatus),
    ]
    .concat();

    format!(
        r#"<h2>Patient Information</h2>
<form method="post" action="/">
  <div class="columns">
    <div class="column">
{left}    </div>
    <div class="column">
{right}    </div>
  </div>
  <button type="submit">Predict</button>
</form>
"#
    )
}

fn select_categorical(input: &FormInput, field: CategoricalField) -> String {
    select(
        field.name(),
        field.display_name(),
        field.labels(),
        input.categorical(field),
    )
}

fn select_flag(name: &str, label: &str, current: &str) -> String {
    select(name, label, &["0", "1"], current.trim())
}

fn select(name: &str, label: &str, options: &[&str], current: &str) -> String {
    let options: String = options
        .iter()
        .map(|option| {
            let selected = if *option == current { " selected" } else { "" };
            let option = escape_html(option);
            format!(r#"        <option value="{option}"{selected}>{option}</option>
"#)
        })
        .collect();
    format!(
        r#"      <label for="{name}">{label}</label>
      <select id="{name}" name="{name}">
{options}      </select>
"#
    )
}

fn number_input(name: &str, label: &str, current: &str, range: &NumericRange) -> String {
    format!(
        r#"      <label for="{name}">{label}</label>
      <input type="number" id="{name}" name="{name}" min="{min}" max="{max}" step="{step}" value="{value}">
"#,
        min = range.min,
        max = range.max,
        step = range.step,
        value = escape_html(current),
    )
}
