//! Clinic records returned by the clinic-finder collaborator.

use serde::{Deserialize, Serialize};

/// Kind of care provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClinicCategory {
    #[serde(rename = "NGO")]
    Ngo,
    Government,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicRecord {
    pub category: ClinicCategory,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f32>,
    #[serde(rename = "location")]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub hours: Vec<String>,
}
