//! Dining Table Model

use serde::{Deserialize, Serialize};

use crate::util::format_timestamp;

/// `available` flag value: the table is free
pub const AVAILABLE: &str = "Y";
/// `available` flag value: the table is seated / has an open order
pub const OCCUPIED: &str = "N";

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    /// Unique table number shown to guests
    pub number: i64,
    /// `"Y"` = free, `"N"` = occupied
    pub available: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DiningTable {
    pub fn is_available(&self) -> bool {
        self.available == AVAILABLE
    }
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: i64,
}

/// Update dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub number: Option<i64>,
    pub available: Option<String>,
}

/// Seat/release request from the floor kiosk.
///
/// `number` seats that table, `old_number` frees the previous one;
/// both present means a reassignment. The acting user re-authenticates
/// with username/password and must hold `table.update`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTableRequest {
    pub number: Option<i64>,
    pub old_number: Option<i64>,
    pub username: String,
    pub password: String,
}

/// Canonical dining table response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableResource {
    pub id: i64,
    pub number: i64,
    pub available: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DiningTable> for DiningTableResource {
    fn from(table: DiningTable) -> Self {
        Self {
            id: table.id,
            number: table.number,
            available: table.available,
            created_at: format_timestamp(table.created_at),
            updated_at: format_timestamp(table.updated_at),
        }
    }
}
