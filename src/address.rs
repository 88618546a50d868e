use crate::records::Metadata;

pub const HOUSE_MARKER: &str = "дом";
const STREET_PREFIX: &str = "улица";
const NO_HOUSE_NUMBER: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressTarget {
    pub full_address: String,
    pub city: String,
}

impl AddressTarget {
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let city = metadata.city();
        let full_address = match metadata.full_address() {
            Some(address) => address,
            None => derive_address(
                metadata.street().as_deref(),
                city.as_deref(),
                metadata.house_number().as_deref(),
            )?,
        };
        Some(Self {
            full_address,
            city: city?,
        })
    }
}

pub fn derive_address(
    street: Option<&str>,
    city: Option<&str>,
    house_number: Option<&str>,
) -> Option<String> {
    let street = street.filter(|s| !s.is_empty())?;
    city.filter(|c| !c.is_empty())?;

    let address = match house_number {
        Some(number) if !number.is_empty() && number != NO_HOUSE_NUMBER => {
            format!("{STREET_PREFIX} {street}, {HOUSE_MARKER} {number}")
        }
        _ => format!("{STREET_PREFIX} {street}"),
    };
    Some(address.trim().to_string())
}

pub fn build_query(full_address: &str, city: &str) -> Option<String> {
    if full_address.is_empty() || city.is_empty() {
        return None;
    }
    if full_address.to_lowercase().contains(&city.to_lowercase()) {
        Some(full_address.to_string())
    } else {
        Some(format!("{full_address}, {city}"))
    }
}

// Cut at the first house marker; the city is re-appended even if the street part names it.
pub fn simplified_query(full_address: &str, city: &str) -> Option<String> {
    let (street_part, _) = full_address.split_once(HOUSE_MARKER)?;
    let street_part = street_part.trim().trim_end_matches(',');
    Some(format!("{street_part}, {city}"))
}

/// Primary query plus the optional fallback issued when the primary finds nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub primary: String,
    pub fallback: Option<String>,
}

impl QueryPlan {
    pub fn new(full_address: &str, city: &str) -> Option<Self> {
        let primary = build_query(full_address, city)?;
        Some(Self {
            primary,
            fallback: simplified_query(full_address, city),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata(value: serde_json::Value) -> Metadata {
        match value {
            serde_json::Value::Object(map) => Metadata::new(map),
            _ => panic!("metadata fixture must be an object"),
        }
    }

    #[test]
    fn derives_address_with_house_number() {
        assert_eq!(
            derive_address(Some("Ленина"), Some("Минск"), Some("5")).as_deref(),
            Some("улица Ленина, дом 5")
        );
    }

    #[test]
    fn omits_zero_or_missing_house_number() {
        assert_eq!(
            derive_address(Some("Ленина"), Some("Минск"), Some("0")).as_deref(),
            Some("улица Ленина")
        );
        assert_eq!(
            derive_address(Some("Ленина"), Some("Минск"), None).as_deref(),
            Some("улица Ленина")
        );
    }

    #[test]
    fn derivation_needs_street_and_city() {
        assert!(derive_address(None, Some("Минск"), Some("5")).is_none());
        assert!(derive_address(Some("Ленина"), None, Some("5")).is_none());
    }

    #[test]
    fn appends_city_only_when_missing() {
        assert_eq!(
            build_query("ул. Мира 10, Минск", "Минск").as_deref(),
            Some("ул. Мира 10, Минск")
        );
        assert_eq!(
            build_query("ул. Мира 10", "Минск").as_deref(),
            Some("ул. Мира 10, Минск")
        );
        assert_eq!(
            build_query("ул. Мира 10, МИНСК", "минск").as_deref(),
            Some("ул. Мира 10, МИНСК")
        );
    }

    #[test]
    fn query_requires_address_and_city() {
        assert!(build_query("", "Минск").is_none());
        assert!(build_query("ул. Мира 10", "").is_none());
    }

    #[test]
    fn plans_fallback_only_for_house_marker() {
        let plan = QueryPlan::new("улица Ленина, дом 5", "Минск").unwrap();
        assert_eq!(plan.primary, "улица Ленина, дом 5, Минск");
        assert_eq!(plan.fallback.as_deref(), Some("улица Ленина, Минск"));

        let plan = QueryPlan::new("ул. Мира 10", "Минск").unwrap();
        assert!(plan.fallback.is_none());
    }

    #[test]
    fn simplified_query_keeps_city_even_if_address_named_it() {
        assert_eq!(
            simplified_query("Минск, улица Лобанка, дом 94", "Минск").as_deref(),
            Some("Минск, улица Лобанка, Минск")
        );
    }

    #[test]
    fn prefers_computed_full_address() {
        let target = AddressTarget::from_metadata(&metadata(json!({
            "full_address_computed": "пр. Независимости 1",
            "street": "Ленина",
            "city": "Минск"
        })))
        .unwrap();
        assert_eq!(target.full_address, "пр. Независимости 1");
        assert_eq!(target.city, "Минск");
    }

    #[test]
    fn computed_address_without_city_is_not_resolvable() {
        assert!(AddressTarget::from_metadata(&metadata(json!({
            "full_address_computed": "пр. Независимости 1"
        })))
        .is_none());
        assert!(AddressTarget::from_metadata(&metadata(json!({
            "street": "Ленина",
            "house_number": "5"
        })))
        .is_none());
    }
}
