//! Backend resources and response shapes.

use std::fmt;

use serde_json::Value;
use tracing::warn;

use super::error::{ApiError, Result};
use crate::grid::{Row, RowId};

/// A listable, editable backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Accounts.
    Users,
    /// Apartments / units.
    Units,
    /// Bookable common spaces.
    Spaces,
    /// Space reservations.
    Reservations,
    /// Condominium events.
    Events,
    /// Notices.
    Notices,
    /// Packages received at the front desk.
    Packages,
    /// Registered visitors.
    Visitors,
    /// Registered vehicles.
    Vehicles,
}

impl Resource {
    /// Every resource, in navigation order.
    pub const ALL: &'static [Resource] = &[
        Resource::Users,
        Resource::Units,
        Resource::Spaces,
        Resource::Reservations,
        Resource::Events,
        Resource::Notices,
        Resource::Packages,
        Resource::Visitors,
        Resource::Vehicles,
    ];

    /// Collection path relative to the API base URL, without slashes.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Users => "access/users",
            Resource::Units => "cadastros/unidades",
            Resource::Spaces => "cadastros/espacos",
            Resource::Reservations => "cadastros/espacos/reservas",
            Resource::Events => "cadastros/eventos",
            Resource::Notices => "cadastros/avisos",
            Resource::Packages => "cadastros/encomendas",
            Resource::Visitors => "cadastros/visitantes",
            Resource::Vehicles => "cadastros/veiculos",
        }
    }

    /// Path of the listing endpoint.
    pub fn list_path(&self) -> String {
        format!("{}/", self.path())
    }

    /// Path of the partial-update endpoint for one record.
    ///
    /// Users are updated through their profile.
    pub fn update_path(&self, id: &RowId) -> String {
        match self {
            Resource::Users => format!("access/profile/{}/", id),
            _ => format!("{}/{}/update/", self.path(), id),
        }
    }

    /// Path of the creation endpoint.
    pub fn create_path(&self) -> String {
        match self {
            Resource::Users => "access/create/".to_string(),
            _ => format!("{}/create/", self.path()),
        }
    }

    /// Path of the deletion endpoint, if records can be deleted.
    ///
    /// Accounts are deactivated, never deleted.
    pub fn delete_path(&self, id: &RowId) -> Option<String> {
        match self {
            Resource::Users => None,
            _ => Some(format!("{}/{}/delete/", self.path(), id)),
        }
    }

    /// Screen title.
    pub fn title(&self) -> &'static str {
        match self {
            Resource::Users => "Usuários",
            Resource::Units => "Unidades",
            Resource::Spaces => "Espaços",
            Resource::Reservations => "Reservas",
            Resource::Events => "Eventos",
            Resource::Notices => "Avisos",
            Resource::Packages => "Encomendas",
            Resource::Visitors => "Visitantes",
            Resource::Vehicles => "Veículos",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Records on this page.
    pub rows: Vec<Row>,
    /// Number of pages, at least 1.
    pub total_pages: u32,
}

impl Page {
    /// Normalise a listing response.
    ///
    /// Paginated responses look like `{"results": [...], "num_pages": N,
    /// "count": C}`; when `num_pages` is absent the page count is derived
    /// from `count` and `page_size`. A bare array is a single page.
    pub fn from_value(value: Value, page_size: u32) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self {
                rows: rows_from(items),
                total_pages: 1,
            }),
            Value::Object(mut object) => {
                let results = match object.remove("results") {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(ApiError::InvalidResponse(format!(
                            "'results' is not an array: {}",
                            other
                        )))
                    }
                    None => {
                        return Err(ApiError::InvalidResponse(
                            "listing has no 'results' field".to_string(),
                        ))
                    }
                };

                let num_pages = object.get("num_pages").and_then(Value::as_u64).unwrap_or(0);
                let total_pages = if num_pages > 0 {
                    num_pages
                } else {
                    let count = object.get("count").and_then(Value::as_u64).unwrap_or(0);
                    count.div_ceil(u64::from(page_size.max(1)))
                };

                Ok(Self {
                    rows: rows_from(results),
                    total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX).max(1),
                })
            }
            other => Err(ApiError::InvalidResponse(format!(
                "unexpected listing shape: {}",
                other
            ))),
        }
    }
}

fn rows_from(items: Vec<Value>) -> Vec<Row> {
    items
        .into_iter()
        .filter_map(|item| {
            let row = Row::from_value(item);
            if row.is_none() {
                warn!("Skipping non-object entry in listing");
            }
            row
        })
        .collect()
}

/// Occupied dates from an availability response: either
/// `{"datas_ocupadas": [...]}` or a bare array of ISO dates.
pub fn occupied_dates(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(object) => match object.get("datas_ocupadas") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
