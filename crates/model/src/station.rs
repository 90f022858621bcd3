use chrono::{DateTime, TimeZone as _, Utc};
use schemars::{gen::SchemaGenerator, schema::Schema, JsonSchema};
use serde::{Deserialize, Serialize};
use utility::id::{prefixed_id_schema, HasId, Id, PrefixedId};
use uuid::Uuid;

use crate::ExampleData;

/// A filling station which captures are collected for.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub name: String,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub station_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HasId for Station {
    type IdType = String;
}

impl PrefixedId for Station {
    const PREFIX: &'static str = "STN";
}

impl Station {
    pub fn generate_id() -> Id<Station> {
        Id::from_entropy(&Uuid::new_v4().simple().to_string())
    }
}

impl ExampleData for Station {
    fn example_data() -> Self {
        Self {
            name: "Mega Fuel Station Ikeja".to_owned(),
            owner_name: Some("Adaeze Okafor".to_owned()),
            phone: Some("08012345678".to_owned()),
            station_type: Some("Petrol Station".to_owned()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
        }
    }
}

/// Payload to register a new station.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewStation {
    pub name: String,
    pub owner_name: Option<String>,
    pub phone: Option<String>,
    pub station_type: Option<String>,
}

impl NewStation {
    /// Trims all fields and drops empty optional ones. Returns `None` if no
    /// name remains.
    pub fn normalized(self) -> Option<Self> {
        fn non_empty(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }

        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            owner_name: non_empty(self.owner_name),
            phone: non_empty(self.phone),
            station_type: non_empty(self.station_type),
        })
    }

    pub fn into_station(self, created_at: DateTime<Utc>) -> Station {
        Station {
            name: self.name,
            owner_name: self.owner_name,
            phone: self.phone,
            station_type: self.station_type,
            created_at,
        }
    }
}

impl ExampleData for NewStation {
    fn example_data() -> Self {
        let station = Station::example_data();
        Self {
            name: station.name,
            owner_name: station.owner_name,
            phone: station.phone,
            station_type: station.station_type,
        }
    }
}

/// Schema of a station id path segment.
pub fn station_id_schema(_gen: &mut SchemaGenerator) -> Schema {
    prefixed_id_schema::<Station>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_parse_back() {
        let id = Station::generate_id();
        assert!(id.raw().starts_with("STN-"));
        assert_eq!(id.raw().len(), "STN-".len() + 8);
        assert_eq!(Id::<Station>::parse(&id.raw()), Some(id));
    }

    #[test]
    fn normalization_trims_and_drops_blank_fields() {
        let station = NewStation {
            name: "  Total Lekki ".to_owned(),
            owner_name: Some("   ".to_owned()),
            phone: Some(" 0803 ".to_owned()),
            station_type: None,
        }
        .normalized()
        .unwrap();
        assert_eq!(station.name, "Total Lekki");
        assert_eq!(station.owner_name, None);
        assert_eq!(station.phone.as_deref(), Some("0803"));
    }

    #[test]
    fn blank_name_is_rejected() {
        let station = NewStation {
            name: " \t".to_owned(),
            owner_name: None,
            phone: None,
            station_type: None,
        };
        assert!(station.normalized().is_none());
    }
}
