//! Read-only carrier directory
//!
//! Loaded once at startup from a JSON array of carrier records and shared by
//! reference with every handler. Lookups are linear scans; the first matching
//! record wins.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Carrier {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mc_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dot_number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub carrier_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub zip: String,
    /// Fields the directory does not interpret, echoed back untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Carrier {
    pub fn is_active(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case("active")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read carrier source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("carrier source {} is not a list of carrier records: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Found,
    Inactive,
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct CarrierCheck<'a> {
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<&'a Carrier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Filter set for listing carriers. Values are expected to be trimmed and
/// non-empty; `None` means the field is not constrained.
#[derive(Debug, Clone, Default)]
pub struct CarrierFilter {
    pub status: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub name: Option<String>,
    pub mc_number: Option<String>,
    pub dot_number: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CarrierList<'a> {
    pub count: usize,
    pub results: Vec<&'a Carrier>,
}

#[derive(Debug, Clone, Default)]
pub struct CarrierDirectory {
    carriers: Vec<Carrier>,
}

impl CarrierDirectory {
    pub fn new(carriers: Vec<Carrier>) -> Self {
        Self { carriers }
    }

    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let bytes = fs::read(path).map_err(|source| DirectoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let carriers: Vec<Carrier> =
            serde_json::from_slice(&bytes).map_err(|source| DirectoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self::new(carriers))
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Finds the first record matching every supplied identifier. Returns
    /// `None` when neither identifier is supplied.
    pub fn find_by_identifiers(
        &self,
        mc_number: Option<&str>,
        dot_number: Option<&str>,
    ) -> Option<&Carrier> {
        let mc_number = provided(mc_number);
        let dot_number = provided(dot_number);
        if mc_number.is_none() && dot_number.is_none() {
            return None;
        }

        self.carriers.iter().find(|carrier| {
            mc_number.map_or(true, |mc| carrier.mc_number.trim() == mc)
                && dot_number.map_or(true, |dot| carrier.dot_number.trim() == dot)
        })
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Carrier> {
        let id = provided(Some(id))?;
        self.carriers
            .iter()
            .find(|carrier| carrier.mc_number.trim() == id || carrier.dot_number.trim() == id)
    }

    pub fn find_by_mc(&self, mc_number: &str) -> Option<&Carrier> {
        self.find_by_identifiers(Some(mc_number), None)
    }

    pub fn find_by_dot(&self, dot_number: &str) -> Option<&Carrier> {
        self.find_by_identifiers(None, Some(dot_number))
    }

    pub fn check(
        &self,
        mc_number: Option<&str>,
        dot_number: Option<&str>,
    ) -> Result<CarrierCheck<'_>, AppError> {
        if provided(mc_number).is_none() && provided(dot_number).is_none() {
            return Err(AppError::bad_request(
                "bad_request",
                "mc_number or dot_number is required",
            ));
        }

        let check = match self.find_by_identifiers(mc_number, dot_number) {
            None => CarrierCheck {
                status: CheckStatus::NotFound,
                carrier: None,
                message: Some("Carrier is not registered."),
            },
            Some(carrier) if carrier.is_active() => CarrierCheck {
                status: CheckStatus::Found,
                carrier: Some(carrier),
                message: None,
            },
            Some(carrier) => CarrierCheck {
                status: CheckStatus::Inactive,
                carrier: Some(carrier),
                message: Some("Carrier is registered but not active."),
            },
        };

        Ok(check)
    }

    pub fn filter(&self, filter: &CarrierFilter) -> CarrierList<'_> {
        let matched: Vec<&Carrier> = self
            .carriers
            .iter()
            .filter(|carrier| matches_filter(carrier, filter))
            .collect();

        let count = matched.len();
        let results = match filter.limit {
            Some(limit) => matched.into_iter().take(limit).collect(),
            None => matched,
        };

        CarrierList { count, results }
    }
}

fn provided(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn matches_filter(carrier: &Carrier, filter: &CarrierFilter) -> bool {
    let exact = |field: &str, wanted: &Option<String>| {
        wanted
            .as_deref()
            .map_or(true, |wanted| field.trim() == wanted)
    };
    let ignore_case = |field: &str, wanted: &Option<String>| {
        wanted
            .as_deref()
            .map_or(true, |wanted| field.trim().to_lowercase() == wanted.to_lowercase())
    };
    let name_contains = filter.name.as_deref().map_or(true, |needle| {
        carrier
            .carrier_name
            .to_lowercase()
            .contains(&needle.to_lowercase())
    });

    ignore_case(&carrier.status, &filter.status)
        && ignore_case(&carrier.city, &filter.city)
        && exact(&carrier.zip, &filter.zip)
        && exact(&carrier.mc_number, &filter.mc_number)
        && exact(&carrier.dot_number, &filter.dot_number)
        && name_contains
}
